#[cfg(test)]
mod resolver_tests {
    use rlox as lox;

    use lox::error::LoxError;
    use lox::parser::{Expr, ExprId, Parser, Stmt};
    use lox::resolver::{Locals, Resolver};
    use lox::scanner::Scanner;
    use lox::token::Token;

    fn resolve_source(source: &str) -> Result<Locals, LoxError> {
        let tokens: Vec<Token<'_>> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<Token<'_>>, LoxError>>()
            .expect("source should scan cleanly");
        let statements = Parser::new(&tokens)
            .parse()
            .expect("source should parse cleanly");
        Resolver::new().resolve(&statements)
    }

    /// For every reference or assignment to `name`, in AST order, the depth
    /// the resolver recorded (`None` = left for global lookup).
    fn depths_of(source: &str, name: &str) -> Vec<Option<usize>> {
        let tokens: Vec<Token<'_>> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<Token<'_>>, LoxError>>()
            .expect("source should scan cleanly");
        let statements = Parser::new(&tokens)
            .parse()
            .expect("source should parse cleanly");
        let locals: Locals = Resolver::new()
            .resolve(&statements)
            .expect("source should resolve cleanly");

        let mut ids: Vec<ExprId> = Vec::new();
        for stmt in &statements {
            collect_stmt(stmt, name, &mut ids);
        }

        ids.iter().map(|id| locals.get(id).copied()).collect()
    }

    fn collect_stmt(stmt: &Stmt<'_>, name: &str, out: &mut Vec<ExprId>) {
        match stmt {
            Stmt::Expression(e) | Stmt::Print(e) => collect_expr(e, name, out),
            Stmt::Var { initializer, .. } => collect_expr(initializer, name, out),
            Stmt::Block(statements) => {
                for s in statements {
                    collect_stmt(s, name, out);
                }
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                collect_expr(condition, name, out);
                collect_stmt(then_branch, name, out);
                if let Some(eb) = else_branch {
                    collect_stmt(eb, name, out);
                }
            }
            Stmt::While { condition, body } => {
                collect_expr(condition, name, out);
                collect_stmt(body, name, out);
            }
            Stmt::Function { body, .. } => {
                for s in body {
                    collect_stmt(s, name, out);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(e) = value {
                    collect_expr(e, name, out);
                }
            }
        }
    }

    fn collect_expr(expr: &Expr<'_>, name: &str, out: &mut Vec<ExprId>) {
        match expr {
            Expr::Literal(_) | Expr::Nop => {}
            Expr::Grouping(inner) => collect_expr(inner, name, out),
            Expr::Unary { right, .. } => collect_expr(right, name, out),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                collect_expr(left, name, out);
                collect_expr(right, name, out);
            }
            Expr::Variable { name: token, id } => {
                if token.lexeme == name {
                    out.push(*id);
                }
            }
            Expr::Assign {
                name: token,
                id,
                value,
            } => {
                if token.lexeme == name {
                    out.push(*id);
                }
                collect_expr(value, name, out);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                collect_expr(callee, name, out);
                for arg in arguments {
                    collect_expr(arg, name, out);
                }
            }
        }
    }

    #[test]
    fn test_global_occurrences_have_no_entry() {
        assert_eq!(depths_of("var a = 1; print a;", "a"), vec![None]);
    }

    #[test]
    fn test_block_local_resolves_at_depth_zero() {
        assert_eq!(depths_of("{ var a = 1; print a; }", "a"), vec![Some(0)]);
    }

    #[test]
    fn test_reference_from_nested_block_counts_hops() {
        assert_eq!(
            depths_of("{ var a = 1; { print a; } }", "a"),
            vec![Some(1)]
        );
        assert_eq!(
            depths_of("{ var a = 1; { { print a; } } }", "a"),
            vec![Some(2)]
        );
    }

    #[test]
    fn test_shadowing_resolves_to_innermost_declaration() {
        assert_eq!(
            depths_of("{ var a = 1; { var a = 2; print a; } }", "a"),
            vec![Some(0)]
        );
    }

    #[test]
    fn test_parameters_live_in_the_function_scope() {
        assert_eq!(depths_of("fun f(x) { print x; }", "x"), vec![Some(0)]);
    }

    #[test]
    fn test_closure_reference_crosses_the_function_scope() {
        assert_eq!(
            depths_of("{ var x = 1; fun f() { print x; } }", "x"),
            vec![Some(1)]
        );
    }

    #[test]
    fn test_recursive_reference_to_enclosing_function_name() {
        assert_eq!(depths_of("{ fun f() { f(); } }", "f"), vec![Some(1)]);
    }

    #[test]
    fn test_assignments_are_recorded_too() {
        assert_eq!(depths_of("{ var a = 1; a = 2; }", "a"), vec![Some(0)]);
    }

    #[test]
    fn test_no_hoisting_later_declaration_does_not_capture() {
        // `print a` runs before `var a` declares anything; the occurrence
        // stays global and fails (or succeeds) against the globals at runtime
        assert_eq!(depths_of("{ print a; var a = 1; }", "a"), vec![None]);
    }

    #[test]
    fn test_lowered_for_loop_depths() {
        // { var i = 0; while (i < 3) { print i; i = i + 1; } }
        assert_eq!(
            depths_of("for (var i = 0; i < 3; i = i + 1) print i;", "i"),
            vec![Some(0), Some(1), Some(1), Some(1)]
        );
    }

    #[test]
    fn test_read_in_own_initializer_fails() {
        let result = resolve_source("{ var a = a; }");

        match result {
            Err(LoxError::Resolve { message, .. }) => {
                assert!(message.contains("its own initializer"));
            }
            other => panic!("Expected resolve error, got {:?}", other),
        }
    }

    #[test]
    fn test_initializer_reading_another_name_is_fine() {
        assert!(resolve_source("{ var a = 1; var b = a; }").is_ok());
    }

    #[test]
    fn test_redeclaration_in_same_scope_fails() {
        let result = resolve_source("{ var a = 1; var a = 2; }");

        match result {
            Err(LoxError::Resolve { message, .. }) => {
                assert!(message.contains("already declared"));
            }
            other => panic!("Expected resolve error, got {:?}", other),
        }
    }

    #[test]
    fn test_global_redeclaration_is_allowed() {
        assert!(resolve_source("var a = 1; var a = 2;").is_ok());
    }

    #[test]
    fn test_return_at_top_level_fails() {
        let result = resolve_source("return 1;");

        match result {
            Err(LoxError::Resolve { message, line }) => {
                assert!(message.contains("outside of function"));
                assert_eq!(line, 1);
            }
            other => panic!("Expected resolve error, got {:?}", other),
        }
    }

    #[test]
    fn test_return_inside_function_is_allowed() {
        assert!(resolve_source("fun f() { return 1; }").is_ok());
        // even when the function declaration sits inside a block
        assert!(resolve_source("{ fun f() { if (true) return; } }").is_ok());
    }
}
