#[cfg(test)]
mod parser_tests {
    use rlox as lox;

    use lox::ast_printer::AstPrinter;
    use lox::error::LoxError;
    use lox::parser::{Expr, LiteralValue, Parser, Stmt};
    use lox::scanner::Scanner;
    use lox::token::Token;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        Scanner::new(source.as_bytes())
            .collect::<Result<Vec<Token<'_>>, LoxError>>()
            .expect("source should scan cleanly")
    }

    fn printed_expression(source: &str) -> String {
        let tokens = tokens(source);
        let expr = Parser::new(&tokens)
            .parse_expression()
            .expect("source should parse cleanly");
        AstPrinter::print(&expr)
    }

    #[test]
    fn test_parser_01_precedence_ladder() {
        assert_eq!(printed_expression("1 + 2 / 3"), "(+ 1 (/ 2 3))");
        assert_eq!(printed_expression("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(printed_expression("1 * 2 - 3 / 4"), "(- (* 1 2) (/ 3 4))");
        assert_eq!(printed_expression("1 < 2 == true"), "(== (< 1 2) true)");
    }

    #[test]
    fn test_parser_02_grouping_beats_precedence() {
        assert_eq!(printed_expression("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
    }

    #[test]
    fn test_parser_03_unary_chains() {
        assert_eq!(printed_expression("!!true"), "(! (! true))");
        assert_eq!(printed_expression("-4.5"), "(- 4.5)");
        assert_eq!(printed_expression("--3"), "(- (- 3))");
    }

    #[test]
    fn test_parser_04_logical_precedence() {
        // `and` binds tighter than `or`
        assert_eq!(printed_expression("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn test_parser_05_assignment_is_right_associative() {
        assert_eq!(printed_expression("a = b = 1"), "(= a (= b 1))");
    }

    #[test]
    fn test_parser_06_call_chains_nest() {
        assert_eq!(printed_expression("f(1)(2, 3)"), "(call (call f 1) 2 3)");
        assert_eq!(printed_expression("f()"), "(call f)");
    }

    #[test]
    fn test_invalid_assignment_target_is_an_error() {
        let tokens = tokens("(a) = 3");
        let result = Parser::new(&tokens).parse_expression();

        match result {
            Err(LoxError::Parse { message, .. }) => {
                assert!(message.contains("Invalid assignment target"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let tokens = tokens("1 + 2 3");
        let result = Parser::new(&tokens).parse_expression();

        match result {
            Err(LoxError::Parse { message, .. }) => {
                assert!(message.contains("Expected end of expression"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_var_without_initializer_carries_nop() {
        let tokens = tokens("var x;");
        let statements = Parser::new(&tokens).parse().unwrap();

        assert_eq!(statements.len(), 1);

        let Stmt::Var { name, initializer } = &statements[0] else {
            panic!("Expected var declaration, got {:?}", statements[0]);
        };
        assert_eq!(name.lexeme, "x");
        assert_eq!(*initializer, Expr::Nop);
    }

    #[test]
    fn test_var_with_initializer() {
        let tokens = tokens("var x = 1 + 2;");
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::Var { initializer, .. } = &statements[0] else {
            panic!("Expected var declaration, got {:?}", statements[0]);
        };
        assert!(matches!(initializer, Expr::Binary { .. }));
    }

    #[test]
    fn test_for_lowers_to_block_and_while() {
        let tokens = tokens("for (var i = 0; i < 3; i = i + 1) print i;");
        let statements = Parser::new(&tokens).parse().unwrap();

        assert_eq!(statements.len(), 1);

        // { var i = 0; while (i < 3) { print i; i = i + 1; } }
        let Stmt::Block(outer) = &statements[0] else {
            panic!("Expected lowered block, got {:?}", statements[0]);
        };
        assert_eq!(outer.len(), 2);
        assert!(matches!(outer[0], Stmt::Var { .. }));

        let Stmt::While { condition, body } = &outer[1] else {
            panic!("Expected lowered while, got {:?}", outer[1]);
        };
        assert!(matches!(condition, Expr::Binary { .. }));

        let Stmt::Block(inner) = body.as_ref() else {
            panic!("Expected body block, got {:?}", body);
        };
        assert_eq!(inner.len(), 2);
        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn test_for_with_empty_clauses_loops_on_true() {
        let tokens = tokens("for (;;) print 1;");
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::Block(outer) = &statements[0] else {
            panic!("Expected lowered block, got {:?}", statements[0]);
        };
        // no initializer, so the block holds just the while
        assert_eq!(outer.len(), 1);

        let Stmt::While { condition, body } = &outer[0] else {
            panic!("Expected lowered while, got {:?}", outer[0]);
        };
        assert_eq!(*condition, Expr::Literal(LiteralValue::True));
        assert!(matches!(body.as_ref(), Stmt::Print(_)));
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        let tokens = tokens("if (a) if (b) print 1; else print 2;");
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::If {
            then_branch,
            else_branch,
            ..
        } = &statements[0]
        else {
            panic!("Expected if, got {:?}", statements[0]);
        };

        // the outer if has no else; the inner one took it
        assert!(else_branch.is_none());
        assert!(matches!(
            then_branch.as_ref(),
            Stmt::If {
                else_branch: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_function_declaration_shape() {
        let tokens = tokens("fun add(a, b) { return a + b; }");
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::Function { name, params, body } = &statements[0] else {
            panic!("Expected function declaration, got {:?}", statements[0]);
        };
        assert_eq!(name.lexeme, "add");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].lexeme, "a");
        assert_eq!(params[1].lexeme, "b");
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0], Stmt::Return { value: Some(_), .. }));
    }

    #[test]
    fn test_return_without_value() {
        let tokens = tokens("fun f() { return; }");
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::Function { body, .. } = &statements[0] else {
            panic!("Expected function declaration, got {:?}", statements[0]);
        };
        assert!(matches!(body[0], Stmt::Return { value: None, .. }));
    }

    #[test]
    fn test_first_error_aborts_the_parse() {
        // missing ';' after the first statement: nothing is recovered
        let tokens = tokens("print 1 print 2;");
        let result = Parser::new(&tokens).parse();

        match result {
            Err(LoxError::Parse { message, .. }) => {
                assert!(message.contains("Expected ';'"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_argument_cap_at_255() {
        let mut source = String::from("f(");
        for i in 0..256 {
            if i > 0 {
                source.push_str(", ");
            }
            source.push('1');
        }
        source.push_str(");");

        let tokens = tokens(&source);
        let result = Parser::new(&tokens).parse();

        match result {
            Err(LoxError::Parse { message, .. }) => {
                assert!(message.contains("Cannot have more than 255 arguments"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parameter_cap_at_255() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun g({}) {{}}", params.join(", "));

        let tokens = tokens(&source);
        let result = Parser::new(&tokens).parse();

        match result {
            Err(LoxError::Parse { message, .. }) => {
                assert!(message.contains("Cannot have more than 255 parameters"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_variable_occurrences_get_distinct_ids() {
        let tokens = tokens("a + a");
        let expr = Parser::new(&tokens).parse_expression().unwrap();

        let Expr::Binary { left, right, .. } = &expr else {
            panic!("Expected binary expression, got {:?}", expr);
        };
        let (Expr::Variable { id: left_id, .. }, Expr::Variable { id: right_id, .. }) =
            (left.as_ref(), right.as_ref())
        else {
            panic!("Expected two variable references");
        };

        assert_ne!(left_id, right_id);
    }

    #[test]
    fn test_printer_renders_literals_like_values() {
        assert_eq!(printed_expression("3.0"), "3");
        assert_eq!(printed_expression("0.5"), "0.5");
        assert_eq!(printed_expression("nil"), "nil");
        assert_eq!(printed_expression("\"hi\""), "hi");

        // the no-initializer marker renders the way it evaluates
        assert_eq!(AstPrinter::print(&Expr::Nop), "nil");
    }
}
