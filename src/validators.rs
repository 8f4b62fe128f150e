//! Field validation for user-supplied account data.

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')
}

/// Usernames are limited to word characters plus `.@+-`, capped at 150
/// characters. The literal name "me" is reserved for the `/users/me`
/// endpoint and rejected in any casing.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err("Username is too long".to_string());
    }
    if username.eq_ignore_ascii_case("me") {
        return Err("Username \"me\" is reserved".to_string());
    }
    if !username.chars().all(is_username_char) {
        return Err(
            "Username may only contain letters, digits and @/./+/-/_ characters".to_string(),
        );
    }
    Ok(())
}

/// Minimal structural check; full address verification is the mail
/// system's problem.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err("Email is too long".to_string());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Email must contain @".to_string());
    };
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return Err("Email is not a valid address".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_word_characters_and_symbols() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.lice+test@host-1_x").is_ok());
        assert!(validate_username("Пользователь_7").is_ok());
    }

    #[test]
    fn rejects_disallowed_characters() {
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("alice!").is_err());
        assert!(validate_username("a/b").is_err());
    }

    #[test]
    fn rejects_empty_and_overlong() {
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
        assert!(validate_username(&"a".repeat(150)).is_ok());
    }

    #[test]
    fn rejects_reserved_me_in_any_case() {
        assert!(validate_username("me").is_err());
        assert!(validate_username("Me").is_err());
        assert!(validate_username("ME").is_err());
        // "me" as a substring is fine
        assert!(validate_username("mei").is_ok());
        assert!(validate_username("home").is_ok());
    }

    #[test]
    fn email_structure() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("nodomain@").is_err());
        assert!(validate_email("@nolocal").is_err());
        assert!(validate_email("has space@x.com").is_err());
        assert!(validate_email("noat.example.com").is_err());
    }
}
