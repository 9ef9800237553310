//! Form cleaning for dishes, allergens and user accounts.
//!
//! Each form takes raw submitted strings and produces either a typed, trimmed
//! value ready to store or every [`ValidationErrors`] found. Checks that need
//! the database (uniqueness, allergen ownership) live in the server and report
//! through the same error type.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationErrors;
use crate::nutrient::{Nutrient, Nutrients};
use crate::photo::{validate_photo, PhotoMeta};
use crate::policy::AllergenScope;

pub const MAX_DISH_NAME_LEN: usize = 100;
pub const MAX_LOGIN_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_URL_LEN: usize = 2048;
pub const MIN_PASSWORD_LEN: usize = 6;

const REQUIRED: &str = "This field is required.";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern compiles")
});

static LOGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("login pattern compiles"));

/// Raw dish submission as it arrives from a multipart form.
#[derive(Debug, Clone, Default)]
pub struct DishForm {
    pub name: String,
    pub description: Option<String>,
    pub calories: Option<String>,
    pub proteins: Option<String>,
    pub fats: Option<String>,
    pub carbohydrates: Option<String>,
    pub url: Option<String>,
    pub allergens: Vec<String>,
    pub photo: Option<PhotoMeta>,
}

/// A dish submission that passed every field check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDish {
    pub name: String,
    pub description: Option<String>,
    pub nutrients: Nutrients,
    pub url: Option<String>,
    /// Distinct ids in submission order.
    pub allergen_ids: Vec<i64>,
}

impl DishForm {
    fn raw_nutrient(&self, nutrient: Nutrient) -> Option<&str> {
        match nutrient {
            Nutrient::Calories => self.calories.as_deref(),
            Nutrient::Proteins => self.proteins.as_deref(),
            Nutrient::Fats => self.fats.as_deref(),
            Nutrient::Carbohydrates => self.carbohydrates.as_deref(),
        }
    }

    pub fn validate(&self) -> Result<ValidDish, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push_field("name", REQUIRED);
        } else if name.chars().count() > MAX_DISH_NAME_LEN {
            errors.push_field(
                "name",
                format!("Ensure this value has at most {MAX_DISH_NAME_LEN} characters."),
            );
        }

        let mut nutrients = Nutrients::default();
        for nutrient in Nutrient::ALL {
            match clean_nutrient(nutrient, self.raw_nutrient(nutrient)) {
                Ok(value) => nutrients.set(nutrient, value),
                Err(message) => errors.push_field(nutrient.as_str(), message),
            }
        }

        let url = match non_blank(self.url.as_deref()) {
            Some(raw) => match clean_url(raw) {
                Ok(url) => Some(url),
                Err(message) => {
                    errors.push_field("url", message);
                    None
                }
            },
            None => None,
        };

        let mut allergen_ids = Vec::new();
        for raw in &self.allergens {
            match raw.trim().parse::<i64>() {
                Ok(id) if !allergen_ids.contains(&id) => allergen_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.push_field(
                    "allergens",
                    format!("{:?} is not a valid allergen id.", raw.trim()),
                ),
            }
        }

        if let Some(photo) = &self.photo {
            if let Err(e) = validate_photo(photo) {
                errors.push_field("photo", e.to_string());
            }
        }

        errors.into_result(ValidDish {
            name: name.to_string(),
            description: non_blank(self.description.as_deref()).map(str::to_string),
            nutrients,
            url,
            allergen_ids,
        })
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn clean_nutrient(nutrient: Nutrient, raw: Option<&str>) -> Result<Option<f64>, String> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };
    let value: f64 = raw
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| "Enter a number.".to_string())?;
    if value < 0.0 {
        return Err(format!("{} cannot be negative.", nutrient.label()));
    }
    Ok(Some(value))
}

fn clean_url(raw: &str) -> Result<String, String> {
    if raw.chars().count() > MAX_URL_LEN {
        return Err(format!("Ensure this value has at most {MAX_URL_LEN} characters."));
    }
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(raw.to_string())
        }
        _ => Err("Enter a valid URL.".to_string()),
    }
}

/// Trim an allergen name and require it to be non-empty.
pub fn clean_allergen_name(raw: &str) -> Result<String, ValidationErrors> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationErrors::field(
            "name",
            "Allergen name cannot be empty.",
        ));
    }
    Ok(name.to_string())
}

/// The error reported when a name already exists in `scope`, whether caught
/// by the pre-check or by the unique index.
pub fn duplicate_allergen_name(scope: AllergenScope) -> ValidationErrors {
    let message = if scope.is_global() {
        "A global allergen with this name already exists."
    } else {
        "You already have an allergen with this name."
    };
    ValidationErrors::field("name", message)
}

/// Public sign-up form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub login: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<ValidRegistration, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let login = clean_login(&self.username, "username", &mut errors);
        let email = clean_email(&self.email, &mut errors);
        if let Err(message) =
            check_password_pair(Some(&self.password), Some(&self.password_confirmation))
        {
            errors.push_form(message);
        }
        errors.into_result(ValidRegistration {
            login,
            email,
            password: self.password.clone(),
        })
    }
}

/// Staff-only account form. `password` is required on create; on update,
/// leaving both password fields out keeps the current password.
#[derive(Debug, Clone, Default)]
pub struct AdminUserForm {
    pub email: String,
    pub login: String,
    pub is_staff: bool,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAdminUser {
    pub email: String,
    pub login: String,
    pub is_staff: bool,
    pub password: Option<String>,
}

impl AdminUserForm {
    pub fn validate(&self, creating: bool) -> Result<ValidAdminUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let login = clean_login(&self.login, "login", &mut errors);
        let email = clean_email(&self.email, &mut errors);

        let password = non_empty(self.password.as_deref());
        let confirm = non_empty(self.confirm_password.as_deref());

        if creating && password.is_none() {
            errors.push_field("password", REQUIRED);
        } else if password.is_some() || confirm.is_some() {
            if let Err(message) = check_password_pair(password, confirm) {
                errors.push_form(message);
            }
        }

        errors.into_result(ValidAdminUser {
            email,
            login,
            is_staff: self.is_staff,
            password: password.map(str::to_string),
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

/// Passwords must match and be long enough. Only the first failure is
/// reported, as one form-wide message.
fn check_password_pair(password: Option<&str>, confirm: Option<&str>) -> Result<(), String> {
    let password = password.unwrap_or("");
    if password != confirm.unwrap_or("") {
        return Err("Passwords do not match.".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        ));
    }
    Ok(())
}

fn clean_login(raw: &str, field: &str, errors: &mut ValidationErrors) -> String {
    let login = raw.trim();
    if login.is_empty() {
        errors.push_field(field, REQUIRED);
    } else if login.chars().count() > MAX_LOGIN_LEN {
        errors.push_field(
            field,
            format!("Ensure this value has at most {MAX_LOGIN_LEN} characters."),
        );
    } else if !LOGIN_RE.is_match(login) {
        errors.push_field(
            field,
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    login.to_string()
}

fn clean_email(raw: &str, errors: &mut ValidationErrors) -> String {
    let email = raw.trim();
    if email.is_empty() {
        errors.push_field("email", REQUIRED);
    } else if email.chars().count() > MAX_EMAIL_LEN {
        errors.push_field(
            "email",
            format!("Ensure this value has at most {MAX_EMAIL_LEN} characters."),
        );
    } else if !EMAIL_RE.is_match(email) {
        errors.push_field("email", "Enter a valid email address.");
    }
    email.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(name: &str) -> DishForm {
        DishForm {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_dish() {
        let valid = dish("  Borscht ").validate().unwrap();
        assert_eq!(valid.name, "Borscht");
        assert_eq!(valid.nutrients, Nutrients::default());
        assert!(valid.allergen_ids.is_empty());
        assert!(valid.url.is_none());
    }

    #[test]
    fn test_nutrients_stored_as_submitted() {
        let form = DishForm {
            calories: Some("250.5".to_string()),
            proteins: Some("0".to_string()),
            fats: Some("".to_string()),
            carbohydrates: Some(" 12 ".to_string()),
            ..dish("Soup")
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.nutrients.calories, Some(250.5));
        assert_eq!(valid.nutrients.proteins, Some(0.0));
        assert_eq!(valid.nutrients.fats, None);
        assert_eq!(valid.nutrients.carbohydrates, Some(12.0));
    }

    #[test]
    fn test_any_negative_nutrient_rejects_all() {
        let form = DishForm {
            calories: Some("100".to_string()),
            fats: Some("-0.1".to_string()),
            ..dish("Soup")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.messages_for("fats"), vec!["Fats cannot be negative."]);
        assert!(errors.messages_for("calories").is_empty());
    }

    #[test]
    fn test_non_numeric_and_non_finite_nutrients() {
        let form = DishForm {
            calories: Some("lots".to_string()),
            proteins: Some("NaN".to_string()),
            fats: Some("inf".to_string()),
            ..dish("Soup")
        };
        let errors = form.validate().unwrap_err();
        for field in ["calories", "proteins", "fats"] {
            assert_eq!(errors.messages_for(field), vec!["Enter a number."]);
        }
    }

    #[test]
    fn test_name_required_and_bounded() {
        assert_eq!(
            dish("   ").validate().unwrap_err().messages_for("name"),
            vec![REQUIRED]
        );
        assert!(dish(&"x".repeat(100)).validate().is_ok());
        assert!(dish(&"x".repeat(101)).validate().is_err());
    }

    #[test]
    fn test_url_rules() {
        let ok = DishForm {
            url: Some("https://example.com/recipe".to_string()),
            ..dish("Soup")
        };
        assert_eq!(
            ok.validate().unwrap().url.as_deref(),
            Some("https://example.com/recipe")
        );

        for bad in ["example.com", "ftp://example.com/x", "https://"] {
            let form = DishForm {
                url: Some(bad.to_string()),
                ..dish("Soup")
            };
            assert!(form.validate().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_url_length_limit() {
        let base = "https://example.com/";
        let at_limit = format!("{base}{}", "a".repeat(MAX_URL_LEN - base.len()));
        let form = DishForm {
            url: Some(at_limit.clone()),
            ..dish("Soup")
        };
        assert_eq!(form.validate().unwrap().url, Some(at_limit));

        let form = DishForm {
            url: Some(format!("{base}{}", "a".repeat(3000))),
            ..dish("Soup")
        };
        assert_eq!(
            form.validate().unwrap_err().messages_for("url"),
            vec!["Ensure this value has at most 2048 characters."]
        );
    }

    #[test]
    fn test_allergen_ids_deduplicated_and_checked() {
        let form = DishForm {
            allergens: vec!["3".into(), " 1 ".into(), "3".into()],
            ..dish("Soup")
        };
        assert_eq!(form.validate().unwrap().allergen_ids, vec![3, 1]);

        let bad = DishForm {
            allergens: vec!["peanut".into()],
            ..dish("Soup")
        };
        assert_eq!(bad.validate().unwrap_err().messages_for("allergens").len(), 1);
    }

    #[test]
    fn test_photo_error_is_field_scoped() {
        let form = DishForm {
            photo: Some(PhotoMeta {
                filename: "dish.exe".to_string(),
                content_type: "image/png".to_string(),
                size: 100,
            }),
            ..dish("Soup")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.messages_for("photo").len(), 1);
    }

    #[test]
    fn test_allergen_name_trimmed() {
        assert_eq!(clean_allergen_name("  Nuts \n").unwrap(), "Nuts");
        assert!(clean_allergen_name("   ").is_err());
    }

    #[test]
    fn test_duplicate_messages_differ_by_scope() {
        let global = duplicate_allergen_name(AllergenScope::Global);
        let personal = duplicate_allergen_name(AllergenScope::Personal { owner: Some(1) });
        assert_ne!(global, personal);
        assert_eq!(global.messages_for("name").len(), 1);
    }

    fn registration(password: &str, confirmation: &str) -> RegistrationForm {
        RegistrationForm {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn test_registration_ok() {
        let valid = registration("secret1", "secret1").validate().unwrap();
        assert_eq!(valid.login, "alice");
        assert_eq!(valid.email, "alice@example.com");
    }

    #[test]
    fn test_registration_password_errors_are_single_form_error() {
        let errors = registration("secret1", "secret2").validate().unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field, None);
        assert_eq!(errors.errors()[0].message, "Passwords do not match.");

        let errors = registration("abc", "abc").validate().unwrap_err();
        assert_eq!(
            errors.errors()[0].message,
            "Password must be at least 6 characters."
        );
    }

    #[test]
    fn test_registration_email_and_username() {
        let form = RegistrationForm {
            username: "bad name".to_string(),
            email: "not-an-email".to_string(),
            ..registration("secret1", "secret1")
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.messages_for("username").len(), 1);
        assert_eq!(
            errors.messages_for("email"),
            vec!["Enter a valid email address."]
        );
    }

    #[test]
    fn test_registration_email_length_limit() {
        let local = "a".repeat(MAX_EMAIL_LEN - "@example.com".len());
        let form = RegistrationForm {
            email: format!("{local}@example.com"),
            ..registration("secret1", "secret1")
        };
        assert!(form.validate().is_ok());

        let form = RegistrationForm {
            email: format!("{}@example.com", "a".repeat(260)),
            ..registration("secret1", "secret1")
        };
        assert_eq!(
            form.validate().unwrap_err().messages_for("email"),
            vec!["Ensure this value has at most 254 characters."]
        );
    }

    #[test]
    fn test_admin_form_password_required_on_create_only() {
        let form = AdminUserForm {
            email: "bob@example.com".to_string(),
            login: "bob".to_string(),
            ..Default::default()
        };
        assert_eq!(
            form.validate(true).unwrap_err().messages_for("password"),
            vec![REQUIRED]
        );
        let valid = form.validate(false).unwrap();
        assert_eq!(valid.password, None);
    }

    #[test]
    fn test_admin_form_confirm_alone_triggers_check() {
        let form = AdminUserForm {
            email: "bob@example.com".to_string(),
            login: "bob".to_string(),
            confirm_password: Some("secret1".to_string()),
            ..Default::default()
        };
        let errors = form.validate(false).unwrap_err();
        assert_eq!(errors.errors()[0].message, "Passwords do not match.");
    }

    #[test]
    fn test_admin_form_short_matching_password() {
        let form = AdminUserForm {
            email: "bob@example.com".to_string(),
            login: "bob".to_string(),
            is_staff: true,
            password: Some("12345".to_string()),
            confirm_password: Some("12345".to_string()),
        };
        assert!(form.validate(true).is_err());

        let form = AdminUserForm {
            password: Some("123456".to_string()),
            confirm_password: Some("123456".to_string()),
            ..form
        };
        let valid = form.validate(true).unwrap();
        assert!(valid.is_staff);
        assert_eq!(valid.password.as_deref(), Some("123456"));
    }
}
