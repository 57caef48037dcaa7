pub use self::glob::GlobPattern;

pub mod glob {
    use std::ops::Deref;

    use ::glob::{Pattern, PatternError};
    use ::serde::{Deserialize, Serialize};

    /// `glob::Pattern` that (de)serializes as its source string.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct GlobPattern(Pattern);

    impl GlobPattern {
        pub fn parse(pattern: &str) -> Result<Self, PatternError> {
            Pattern::new(pattern).map(Self)
        }
    }

    impl TryFrom<String> for GlobPattern {
        type Error = PatternError;

        fn try_from(s: String) -> Result<Self, Self::Error> {
            Self::parse(&s)
        }
    }

    impl From<GlobPattern> for String {
        fn from(pat: GlobPattern) -> Self {
            pat.0.as_str().to_owned()
        }
    }

    impl Deref for GlobPattern {
        type Target = Pattern;

        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[derive(Debug, Deserialize, Serialize)]
        struct Doc {
            artifacts: Vec<GlobPattern>,
        }

        #[test]
        fn glob_list_should_roundtrip_through_toml() {
            let doc: Doc = toml::from_str(r#"artifacts = ["*.o", "xv6_fsck"]"#).unwrap();
            assert!(doc.artifacts[0].matches("proc.o"));
            assert!(!doc.artifacts[0].matches("proc.c"));
            assert!(doc.artifacts[1].matches("xv6_fsck"));

            let toml = toml::to_string(&doc).unwrap();
            let again: Doc = toml::from_str(&toml).unwrap();
            assert_eq!(again.artifacts, doc.artifacts);
            assert_eq!(again.artifacts[0].as_str(), "*.o");
        }

        #[test]
        fn invalid_glob_should_be_rejected() {
            let res: Result<Doc, _> = toml::from_str(r#"artifacts = ["[a"]"#);
            assert!(res.is_err());
        }
    }
}
