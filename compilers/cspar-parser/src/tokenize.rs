use nom::{
    bytes::complete::take_while1,
    character::complete::multispace0,
    IResult,
};
use crate::token::{Span, Token};

/// Punctuation is dropped from words, except hyphens ("-s", "-ed" are real entries).
fn is_stripped(c: char) -> bool {
    c.is_ascii_punctuation() && c != '-'
}

fn normalize(word: &str) -> String {
    word.chars()
        .filter(|c| !is_stripped(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Splits on whitespace, case-folds and strips punctuation. Words made only of
/// punctuation disappear. Spans point into `original_input`.
pub fn tokenize(original_input: &str) -> Vec<Token> {
    let mut input = original_input;
    let mut result = Vec::new();

    loop {
        // 1. Skip whitespace
        let (next_input, _) = match multispace0::<&str, nom::error::Error<&str>>(input) {
            Ok(res) => res,
            Err(_) => break,
        };
        input = next_input;

        if input.is_empty() {
            break;
        }

        // 2. Take the word up to the next whitespace
        let parse_res: IResult<&str, &str> = take_while1(|c: char| !c.is_whitespace())(input);

        match parse_res {
            Ok((next_input, word)) => {
                let start = input.as_ptr() as usize - original_input.as_ptr() as usize;
                let text = normalize(word);
                if !text.is_empty() {
                    result.push(Token {
                        span: Span::new(start, start + word.len()),
                        text,
                    });
                }
                input = next_input;
            }
            Err(_) => {
                // multispace0 only stops at ASCII whitespace; skip one char to recover
                if let Some(c) = input.chars().next() {
                    input = &input[c.len_utf8()..];
                } else {
                    break;
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_case_folding_and_punctuation() {
        assert_eq!(texts("The man, ATE!"), vec!["the", "man", "ate"]);
        assert_eq!(texts("  li   si\tle. "), vec!["li", "si", "le"]);
        assert_eq!(texts("don't -s re-do"), vec!["dont", "-s", "re-do"]);
        assert_eq!(texts("a , b ?!"), vec!["a", "b"]);
        assert!(texts("").is_empty());
    }

    #[test]
    fn test_spans_index_original_input() {
        let input = "Li Si 吃 飯.";
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 4);
        assert_eq!(&input[tokens[2].span.start..tokens[2].span.end], "吃");
        assert_eq!(&input[tokens[3].span.start..tokens[3].span.end], "飯.");
        assert_eq!(tokens[3].text, "飯");
    }

    proptest! {
        #[test]
        fn test_tokens_are_normalized(input in "\\PC{0,40}") {
            for token in tokenize(&input) {
                prop_assert!(!token.text.is_empty());
                prop_assert!(!token.text.chars().any(char::is_whitespace));
                prop_assert!(!token.text.chars().any(is_stripped));
                prop_assert!(token.span.len() >= 1);
            }
        }

        #[test]
        fn test_retokenizing_is_stable(input in "[a-zA-Z ,.!-]{0,40}") {
            let once = texts(&input);
            let again = texts(&once.join(" "));
            prop_assert_eq!(once, again);
        }
    }
}
