#[cfg(test)]
mod lexer_tests {
    use crate::error::LexErrorKind;
    use crate::lexer::tokenize;
    use crate::token::TokenKind;

    fn lex_ok(input: &str) -> Vec<TokenKind> {
        let result = tokenize(input);
        assert!(result.error.is_none(), "Unexpected error: {:?}", result.error);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    fn lex_err(input: &str) -> LexErrorKind {
        tokenize(input).error.expect("expected a lexical error").kind
    }

    #[test]
    fn empty_source_is_an_error() {
        assert_eq!(lex_err(""), LexErrorKind::NoSourceCode);
    }

    #[test]
    fn keywords_and_punctuators() {
        assert_eq!(
            lex_ok("var x; begin x := 5 end."),
            vec![
                TokenKind::Var,
                TokenKind::Ident("x".into()),
                TokenKind::Semicolon,
                TokenKind::Begin,
                TokenKind::Ident("x".into()),
                TokenKind::Becomes,
                TokenKind::Number(5),
                TokenKind::End,
                TokenKind::Period,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn relational_operators_greedy() {
        assert_eq!(
            lex_ok("<= <> >= < > ="),
            vec![
                TokenKind::Leq,
                TokenKind::Neq,
                TokenKind::Geq,
                TokenKind::Lss,
                TokenKind::Gtr,
                TokenKind::Eq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            lex_ok("var /* a comment\nspanning lines */ x;"),
            vec![
                TokenKind::Var,
                TokenKind::Ident("x".into()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        assert_eq!(lex_err("var /* never closed"), LexErrorKind::UnterminatedComment);
    }

    #[test]
    fn identifier_exactly_11_chars_is_accepted() {
        assert_eq!(
            lex_ok("abcdefghijk"),
            vec![TokenKind::Ident("abcdefghijk".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn identifier_of_12_chars_is_rejected() {
        assert_eq!(lex_err("abcdefghijkl"), LexErrorKind::NameTooLong);
    }

    #[test]
    fn number_of_5_digits_is_accepted() {
        assert_eq!(lex_ok("12345"), vec![TokenKind::Number(12345), TokenKind::Eof]);
    }

    #[test]
    fn number_of_6_digits_is_rejected() {
        assert_eq!(lex_err("123456"), LexErrorKind::NumberTooLong);
    }

    #[test]
    fn digit_initial_identifier_is_rejected() {
        assert_eq!(lex_err("123abc"), LexErrorKind::NonLetterVarInitial);
    }

    #[test]
    fn lone_colon_is_invalid() {
        assert_eq!(lex_err(":"), LexErrorKind::InvalidSymbol);
    }

    #[test]
    fn unrecognized_character_is_invalid() {
        assert_eq!(lex_err("@"), LexErrorKind::InvalidSymbol);
    }

    #[test]
    fn newline_advances_line_counter() {
        let result = tokenize("var\nx;");
        assert!(result.error.is_none());
        let lines: Vec<usize> = result.tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![0, 1, 1, 1]);
    }

    #[test]
    fn reserved_words_are_exact_matches() {
        // `oddity` is not `odd` — must lex as an identifier.
        assert_eq!(
            lex_ok("oddity"),
            vec![TokenKind::Ident("oddity".into()), TokenKind::Eof]
        );
    }
}
