#[cfg(test)]
pub mod test {
    use std::collections::VecDeque;
    use std::io;

    use crate::prompt::Prompt;
    use crate::table;
    use crate::value::{Table, Value};

    /// One value of every scalar kind, in the order the format fixtures use.
    pub fn scalar_table() -> Table {
        table! {
            "string" => "foo",
            "btrue" => true,
            "bfalse" => false,
            "nnull" => Value::Null,
            "integer" => 123,
            "float" => 12.3,
            "empty" => "",
        }
    }

    #[test]
    fn scalar_table_keeps_insertion_order() {
        let keys: Vec<_> = scalar_table().into_keys().collect();
        assert_eq!(
            keys,
            ["string", "btrue", "bfalse", "nnull", "integer", "float", "empty"]
        );
    }

    // -- Scripted prompt --------------------------------------------------------

    /// A [`Prompt`] that records what it was shown and replies from a script.
    ///
    /// Queued answers are handed out in order; once they run out, every
    /// question is answered with its offered default.
    #[derive(Debug, Default)]
    pub struct CannedPrompt {
        pub banners: Vec<String>,
        /// `(question, encoded default)` pairs, in the order asked.
        pub asked: Vec<(String, String)>,
        answers: VecDeque<String>,
        fail: bool,
    }

    impl CannedPrompt {
        pub fn accepting_defaults() -> Self {
            Self::default()
        }

        pub fn answering<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: answers.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }

        /// Every interaction fails, as a closed terminal would.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn questions(&self) -> Vec<&str> {
            self.asked.iter().map(|(q, _)| q.as_str()).collect()
        }

        fn check(&self) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "prompt closed"));
            }
            Ok(())
        }
    }

    impl Prompt for CannedPrompt {
        fn banner(&mut self, message: &str) -> io::Result<()> {
            self.check()?;
            self.banners.push(message.to_string());
            Ok(())
        }

        fn ask(&mut self, question: &str, default: &str) -> io::Result<String> {
            self.check()?;
            self.asked.push((question.to_string(), default.to_string()));
            Ok(self
                .answers
                .pop_front()
                .unwrap_or_else(|| default.to_string()))
        }
    }
}
