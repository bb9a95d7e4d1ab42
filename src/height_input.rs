//! Reference height entry.

use crate::constants::HEIGHT_PROMPT;
use crate::error::{EstimateError, Result};
#[cfg(test)]
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Asks someone for the reference height. `None` means the request was cancelled.
pub trait HeightInputProvider {
    /// `current` is the height text in effect, offered as the prefilled answer.
    fn request_height(&mut self, current: &str) -> Option<String>;
}

/// Accepted reference height together with the text it was entered as.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceHeight {
    pub meters: f64,
    pub text: String,
}

impl ReferenceHeight {
    pub fn from_meters(meters: f64) -> Self {
        ReferenceHeight {
            meters,
            text: meters.to_string(),
        }
    }
}

/// Parses a height entry: any finite, nonnegative number. Surrounding whitespace is ignored
/// but kept out of the stored text.
pub fn parse_height(input: &str) -> Result<ReferenceHeight> {
    let text = input.trim();
    let meters: f64 = text
        .parse()
        .map_err(|_| EstimateError::InvalidHeightInput(input.to_string()))?;
    if !meters.is_finite() || meters < 0.0 {
        return Err(EstimateError::InvalidHeightInput(input.to_string()));
    }
    Ok(ReferenceHeight {
        meters,
        text: text.to_string(),
    })
}

/// Prompts on a terminal. An empty line keeps the current value, end of input cancels.
pub struct StdinHeightPrompt<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StdinHeightPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        StdinHeightPrompt { input, output }
    }
}

impl<R: BufRead, W: Write> HeightInputProvider for StdinHeightPrompt<R, W> {
    fn request_height(&mut self, current: &str) -> Option<String> {
        let _ = write!(self.output, "{HEIGHT_PROMPT}[{current}] ");
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) if line.trim().is_empty() => Some(current.to_string()),
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Answers from a fixed list, then cancels.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedHeights {
    answers: VecDeque<String>,
    asked: usize,
}

#[cfg(test)]
impl ScriptedHeights {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedHeights {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: 0,
        }
    }

    /// How many times a height was requested.
    pub fn asked(&self) -> usize {
        self.asked
    }
}

#[cfg(test)]
impl HeightInputProvider for ScriptedHeights {
    fn request_height(&mut self, _current: &str) -> Option<String> {
        self.asked += 1;
        self.answers.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn accepts_nonnegative_numbers() {
        assert_eq!(parse_height("1.8").unwrap().meters, 1.8);
        assert_eq!(
            parse_height(" 0 ").unwrap(),
            ReferenceHeight {
                meters: 0.0,
                text: "0".into(),
            }
        );
        assert_eq!(parse_height("1.80").unwrap().text, "1.80");
    }

    #[test]
    fn rejects_negative_garbage_and_empty() {
        for bad in ["-2", "tall", "", "   ", "NaN", "inf", "1.8m"] {
            assert_eq!(
                parse_height(bad),
                Err(EstimateError::InvalidHeightInput(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn default_height_text() {
        assert_eq!(ReferenceHeight::from_meters(1.0).text, "1");
    }

    #[test]
    fn empty_line_keeps_current_value() {
        let mut prompt = StdinHeightPrompt::new(Cursor::new("\n1.75\n"), Vec::new());
        assert_eq!(prompt.request_height("1").as_deref(), Some("1"));
        assert_eq!(prompt.request_height("1").as_deref(), Some("1.75"));
        assert_eq!(prompt.request_height("1.75"), None);
    }

    #[test]
    fn prompt_shows_current_value() {
        let mut output = Vec::new();
        StdinHeightPrompt::new(Cursor::new("2\n"), &mut output).request_height("1.6");
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.starts_with(HEIGHT_PROMPT));
        assert!(shown.contains("[1.6]"));
    }

    #[test]
    fn scripted_answers_run_out_into_cancellation() {
        let mut heights = ScriptedHeights::new(["-2", "1.8"]);
        assert_eq!(heights.request_height("1").as_deref(), Some("-2"));
        assert_eq!(heights.request_height("1").as_deref(), Some("1.8"));
        assert_eq!(heights.request_height("1"), None);
        assert_eq!(heights.asked(), 3);
    }
}
