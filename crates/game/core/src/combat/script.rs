//! Forced-outcome combat scripts.
//!
//! A script is an ordered list of tokens consumed one per strike, used for
//! scripted story combats and non-interactive mock combats where outcomes
//! must be deterministic regardless of the RNG:
//!
//! - `hit1` / `crit1` / `miss1` — force the attacker's next strike
//! - `hit2` / `crit2` / `miss2` — force the defender's next strike
//! - `--` — leave the next strike to normal resolution
//! - `end` — stop forcing; the rest of the combat resolves normally

use std::collections::VecDeque;

use super::StrikerSlot;

/// A forced strike outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ForcedOutcome {
    Hit,
    Crit,
    Miss,
}

/// Script parse errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("unknown combat script token `{0}`")]
    UnknownToken(String),
}

impl crate::error::EngineError for ScriptError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "SCRIPT_UNKNOWN_TOKEN"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Force(StrikerSlot, ForcedOutcome),
    Pass,
    End,
}

/// An ordered list of forced outcomes consumed strike-by-strike.
#[derive(Clone, Debug, Default)]
pub struct CombatScript {
    tokens: VecDeque<Token>,
    ended: bool,
}

impl CombatScript {
    /// Parses the scripted token list.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ScriptError> {
        let mut parsed = VecDeque::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref();
            let parsed_token = match token {
                "--" => Token::Pass,
                "end" => Token::End,
                "hit1" => Token::Force(StrikerSlot::Attacker, ForcedOutcome::Hit),
                "hit2" => Token::Force(StrikerSlot::Defender, ForcedOutcome::Hit),
                "crit1" => Token::Force(StrikerSlot::Attacker, ForcedOutcome::Crit),
                "crit2" => Token::Force(StrikerSlot::Defender, ForcedOutcome::Crit),
                "miss1" => Token::Force(StrikerSlot::Attacker, ForcedOutcome::Miss),
                "miss2" => Token::Force(StrikerSlot::Defender, ForcedOutcome::Miss),
                other => return Err(ScriptError::UnknownToken(other.to_string())),
            };
            parsed.push_back(parsed_token);
        }
        Ok(Self {
            tokens: parsed,
            ended: false,
        })
    }

    /// Consumes the next token for a strike by `slot`.
    ///
    /// Returns the forced outcome, or `None` when the strike resolves
    /// normally (pass token, slot mismatch, exhausted, or past `end`).
    pub fn next_for(&mut self, slot: StrikerSlot) -> Option<ForcedOutcome> {
        if self.ended {
            return None;
        }
        match self.tokens.pop_front() {
            Some(Token::Force(scripted, outcome)) if scripted == slot => Some(outcome),
            Some(Token::Force(scripted, _)) => {
                tracing::warn!(
                    expected = ?slot,
                    scripted = ?scripted,
                    "combat script token striker mismatch, resolving normally"
                );
                None
            }
            Some(Token::Pass) => None,
            Some(Token::End) | None => {
                self.ended = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_forces_in_order() {
        let mut script = CombatScript::parse(&["hit1", "crit2", "miss1", "end"]).unwrap();
        assert_eq!(
            script.next_for(StrikerSlot::Attacker),
            Some(ForcedOutcome::Hit)
        );
        assert_eq!(
            script.next_for(StrikerSlot::Defender),
            Some(ForcedOutcome::Crit)
        );
        assert_eq!(
            script.next_for(StrikerSlot::Attacker),
            Some(ForcedOutcome::Miss)
        );
        // `end`: everything after resolves normally.
        assert_eq!(script.next_for(StrikerSlot::Attacker), None);
        assert_eq!(script.next_for(StrikerSlot::Defender), None);
    }

    #[test]
    fn pass_token_skips_one_strike() {
        let mut script = CombatScript::parse(&["--", "hit1"]).unwrap();
        assert_eq!(script.next_for(StrikerSlot::Attacker), None);
        assert_eq!(
            script.next_for(StrikerSlot::Attacker),
            Some(ForcedOutcome::Hit)
        );
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = CombatScript::parse(&["hit3"]).unwrap_err();
        assert_eq!(err, ScriptError::UnknownToken("hit3".to_string()));
    }
}
