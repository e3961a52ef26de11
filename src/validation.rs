//! Field validation for request bodies.
//!
//! Each rule reports every constraint it violates, keyed by constraint name,
//! so clients see all problems with a field at once.

use std::collections::BTreeMap;

use serde::Serialize;

pub const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub property: String,
    pub constraints: BTreeMap<String, String>,
}

/// Accumulates constraint violations across fields.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, property: &str) -> FieldCheck<'_> {
        FieldCheck {
            validator: self,
            property: property.to_string(),
            constraints: BTreeMap::new(),
        }
    }

    pub fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

pub struct FieldCheck<'a> {
    validator: &'a mut Validator,
    property: String,
    constraints: BTreeMap<String, String>,
}

impl FieldCheck<'_> {
    pub fn not_empty(mut self, value: &str) -> Self {
        if value.is_empty() {
            let msg = format!("{} should not be empty", self.property);
            self.constraints.insert("is_not_empty".into(), msg);
        }
        self
    }

    pub fn length(mut self, value: &str, min: usize, max: usize) -> Self {
        let len = value.chars().count();
        if len < min || len > max {
            let msg = format!("{} must be between {} and {} characters", self.property, min, max);
            self.constraints.insert("is_length".into(), msg);
        }
        self
    }

    pub fn range(mut self, value: u64, min: u64, max: u64) -> Self {
        if value < min {
            let msg = format!("{} must not be less than {}", self.property, min);
            self.constraints.insert("min".into(), msg);
        }
        if value > max {
            let msg = format!("{} must not be greater than {}", self.property, max);
            self.constraints.insert("max".into(), msg);
        }
        self
    }

    pub fn matches(mut self, ok: bool, message: &str) -> Self {
        if !ok {
            let msg = format!("{} {}", self.property, message);
            self.constraints.insert("matches".into(), msg);
        }
        self
    }

    pub fn done(self) {
        if !self.constraints.is_empty() {
            self.validator.errors.push(ValidationError {
                property: self.property,
                constraints: self.constraints,
            });
        }
    }
}

/// 4-20 ASCII alphanumerics.
pub fn check_username(v: &mut Validator, username: &str) {
    v.field("username")
        .not_empty(username)
        .length(username, 4, 20)
        .matches(
            !username.is_empty() && username.chars().all(|c| c.is_ascii_alphanumeric()),
            "must contain only alphanumeric characters",
        )
        .done();
}

/// 8-30 characters. Strength is a property of the configured password, not
/// of a login attempt; see [`is_strong_password`].
pub fn check_password(v: &mut Validator, password: &str) {
    v.field("password")
        .not_empty(password)
        .length(password, 8, 30)
        .done();
}

/// At least one lowercase, uppercase, digit and one of `@$!%*?&`, nothing else.
pub fn is_strong_password(password: &str) -> bool {
    let len = password.chars().count();
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(&c));

    (8..=30).contains(&len)
        && allowed
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(&c))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ')
}

/// Library display name: 2-20 of `[A-Za-z0-9._- ]`.
pub fn check_library_name(v: &mut Validator, property: &str, name: &str) {
    v.field(property)
        .not_empty(name)
        .length(name, 2, 20)
        .matches(
            !name.is_empty() && name.chars().all(is_name_char),
            "must contain only alphanumeric characters",
        )
        .done();
}

/// Absolute directory path; rejects anything ending in a file extension.
pub fn check_directory_path(v: &mut Validator, property: &str, path: &str) {
    v.field(property)
        .not_empty(path)
        .matches(
            is_directory_path(path),
            "must be a valid directory path, starting with a '/' and containing only valid characters. The path should not end with a filename and extension.",
        )
        .done();
}

fn is_directory_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest.is_empty() || !rest.chars().all(|c| is_name_char(c) || c == '/') {
        return false;
    }

    // `/music/song.mp3` is a file, `/music/v1.0/` or `/music/.config` is not
    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) => {
            stem.is_empty()
                || ext.is_empty()
                || ext.len() > 10
                || !ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(f: impl FnOnce(&mut Validator)) -> Vec<ValidationError> {
        let mut v = Validator::new();
        f(&mut v);
        v.finish().err().unwrap_or_default()
    }

    #[test]
    fn empty_credentials_report_every_constraint() {
        let errs = errors(|v| {
            check_username(v, "");
            check_password(v, "");
        });
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].property, "username");
        assert_eq!(errs[0].constraints.len(), 3);
        assert_eq!(errs[0].constraints["is_not_empty"], "username should not be empty");
        assert_eq!(errs[0].constraints["is_length"], "username must be between 4 and 20 characters");
        assert_eq!(errs[1].property, "password");
        assert_eq!(errs[1].constraints.len(), 2);
    }

    #[test]
    fn valid_credentials_pass() {
        assert!(errors(|v| {
            check_username(v, "testUser");
            check_password(v, "testPass1$");
        })
        .is_empty());
    }

    #[test]
    fn password_check_is_length_only() {
        assert!(errors(|v| check_password(v, "correct-pass")).is_empty());

        let errs = errors(|v| check_password(v, "short"));
        assert_eq!(errs[0].constraints.keys().collect::<Vec<_>>(), vec!["is_length"]);
    }

    #[test]
    fn password_strength() {
        assert!(is_strong_password("testPass1$"));
        for weak in ["alllowercase1$", "NoDigits$$", "NoSpecial123", "Has space1$", "Sh0rt$", "correct-pass"] {
            assert!(!is_strong_password(weak), "{} should be weak", weak);
        }
    }

    #[test]
    fn username_rejects_symbols() {
        let errs = errors(|v| check_username(v, "bad-user"));
        assert_eq!(errs[0].constraints.keys().collect::<Vec<_>>(), vec!["matches"]);
    }

    #[test]
    fn directory_paths() {
        for ok in ["/music", "/home/user/My Music", "/data/v1.0/", "/srv/.config", "/a_b-c"] {
            assert!(is_directory_path(ok), "{} should be accepted", ok);
        }
        for bad in ["", "/", "music", "/music/song.mp3", "/etc/passwd#", "/docs/readme.md"] {
            assert!(!is_directory_path(bad), "{} should be rejected", bad);
        }
    }

    #[test]
    fn range_reports_min_and_max() {
        let errs = errors(|v| v.field("size").range(5, 10, 50).done());
        assert_eq!(errs[0].constraints["min"], "size must not be less than 10");

        let errs = errors(|v| v.field("size").range(51, 10, 50).done());
        assert_eq!(errs[0].constraints["max"], "size must not be greater than 50");

        assert!(errors(|v| v.field("size").range(10, 10, 50).done()).is_empty());
    }

    #[test]
    fn library_names() {
        assert!(errors(|v| check_library_name(v, "name", "My Music")).is_empty());
        assert!(!errors(|v| check_library_name(v, "name", "x")).is_empty());
        assert!(!errors(|v| check_library_name(v, "name", "semi;colon")).is_empty());
    }
}
