#[cfg(test)]
mod scanner_tests {
    use rlox as lox;

    use lox::error::LoxError;
    use lox::scanner::*;
    use lox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_comments_and_slash() {
        assert_token_sequence(
            "1 / 2 // the rest is ignored ==\n3",
            &[
                (TokenType::NUMBER(1.0), "1"),
                (TokenType::SLASH, "/"),
                (TokenType::NUMBER(2.0), "2"),
                (TokenType::NUMBER(3.0), "3"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_keywords_vs_identifiers() {
        assert_token_sequence(
            "var foo = true; fun orchid",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "foo"),
                (TokenType::EQUAL, "="),
                (TokenType::TRUE, "true"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::FUN, "fun"),
                // keyword prefix does not make an identifier a keyword
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_number_literals_and_trailing_dot() {
        let scanner = Scanner::new(b"123 3.14 123.");
        let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 5);

        match tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 123.0),
            ref other => panic!("Expected NUMBER, got {:?}", other),
        }
        assert_eq!(tokens[0].lexeme, "123");

        match tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 3.14),
            ref other => panic!("Expected NUMBER, got {:?}", other),
        }

        // the dot after `123` is not part of the number
        match tokens[2].token_type {
            TokenType::NUMBER(n) => assert_eq!(n, 123.0),
            ref other => panic!("Expected NUMBER, got {:?}", other),
        }
        assert_eq!(tokens[3].token_type, TokenType::DOT);
        assert_eq!(tokens[4].token_type, TokenType::EOF);
    }

    #[test]
    fn test_string_literal_payload_excludes_quotes() {
        let scanner = Scanner::new(b"\"hi there\"");
        let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "\"hi there\"");

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hi there"),
            other => panic!("Expected STRING, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_string_advances_line_counter() {
        let scanner = Scanner::new(b"\"a\nb\"\nafter");
        let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 3);

        // the token is emitted once the closing quote on line 2 is seen
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].lexeme, "after");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        let scanner = Scanner::new(b"\"abc");
        let results: Vec<_> = scanner.collect();

        // one error, then the EOF token
        assert_eq!(results.len(), 2);

        match &results[0] {
            Err(LoxError::Lex { message, line }) => {
                assert!(message.contains("Unterminated string"));
                assert_eq!(*line, 1);
            }
            other => panic!("Expected lex error, got {:?}", other),
        }

        assert!(matches!(
            &results[1],
            Ok(token) if token.token_type == TokenType::EOF
        ));
    }

    #[test]
    fn test_unknown_bytes_are_skipped_without_error() {
        // stray characters never abort a scan and produce no tokens
        let scanner = Scanner::new(b",.$(#");
        let results: Vec<_> = scanner.collect();

        assert!(results.iter().all(Result::is_ok));

        let tokens: Vec<Token> = results.into_iter().map(Result::unwrap).collect();
        let kinds: Vec<&'static str> = tokens.iter().map(|t| t.token_type.name()).collect();

        assert_eq!(kinds, vec!["COMMA", "DOT", "LEFT_PAREN", "EOF"]);
    }

    #[test]
    fn test_display_matches_tokenize_format() {
        let scanner = Scanner::new(b"var x = 95; \"hi\" 3.14");
        let lines: Vec<String> = scanner
            .filter_map(Result::ok)
            .map(|t| t.to_string())
            .collect();

        assert_eq!(
            lines,
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 95 95.0",
                "SEMICOLON ; null",
                "STRING \"hi\" hi",
                "NUMBER 3.14 3.14",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_single_eof() {
        let mut scanner = Scanner::new(b"");

        let first = scanner.next();
        assert!(matches!(
            &first,
            Some(Ok(token)) if token.token_type == TokenType::EOF
        ));

        // fused: nothing after the EOF token
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
