//! Built-in validators.
//!
//! Every built-in except [`required`] treats an absent or blank value as
//! valid, so rules compose: pair a format rule with [`required`] when the
//! field is mandatory. Messages are resolved through the
//! [`Environment`](crate::environment::Environment), so
//! a [`MessageCatalog`](crate::environment::MessageCatalog) can localize them.

use crate::environment::ErrorKind;
use crate::validator::{BoxedValidator, cross_field, validator};
use crate::value::FieldValue;

/// Fails when the value is absent, whitespace-only text, or an empty list.
#[must_use]
pub fn required() -> BoxedValidator {
    validator(|value, env| match value {
        Some(value) if !value.is_blank() => None,
        _ => Some(env.resolve(ErrorKind::Required, &[])),
    })
}

/// Fails when a text value is not a plausible email address.
///
/// The check is a heuristic: exactly one `@` with a non-empty local part,
/// and a dotted domain whose labels are non-empty and whose last label has
/// at least two characters.
#[must_use]
pub fn email() -> BoxedValidator {
    validator(|value, env| {
        let text = non_blank_text(value)?;
        if is_plausible_email(text.trim()) {
            None
        } else {
            Some(env.resolve(ErrorKind::Email, &[]))
        }
    })
}

/// Fails when text (in characters) or a list (in items) is shorter than `min`.
#[must_use]
pub fn min_length(min: usize) -> BoxedValidator {
    validator(move |value, env| {
        let len = length_of(value?)?;
        (len < min).then(|| {
            env.resolve(
                ErrorKind::MinLength,
                &[("min", min.to_string()), ("actual", len.to_string())],
            )
        })
    })
}

/// Fails when text (in characters) or a list (in items) is longer than `max`.
#[must_use]
pub fn max_length(max: usize) -> BoxedValidator {
    validator(move |value, env| {
        let len = length_of(value?)?;
        (len > max).then(|| {
            env.resolve(
                ErrorKind::MaxLength,
                &[("max", max.to_string()), ("actual", len.to_string())],
            )
        })
    })
}

/// Fails when a numeric value lies outside `min..=max`.
#[must_use]
pub fn range(min: f64, max: f64) -> BoxedValidator {
    validator(move |value, env| {
        let number = value.and_then(FieldValue::as_number)?;
        (number < min || number > max).then(|| {
            env.resolve(
                ErrorKind::Range,
                &[("min", min.to_string()), ("max", max.to_string())],
            )
        })
    })
}

/// Fails when text does not contain `pattern`.
#[must_use]
pub fn contains(pattern: impl Into<String>) -> BoxedValidator {
    let pattern = pattern.into();
    validator(move |value, env| {
        let text = non_blank_text(value)?;
        (!text.contains(pattern.as_str())).then(|| env.resolve(ErrorKind::Pattern, &[]))
    })
}

/// Fails when text is not exactly `expected`.
#[must_use]
pub fn exact(expected: impl Into<String>) -> BoxedValidator {
    let expected = expected.into();
    validator(move |value, env| {
        let text = non_blank_text(value)?;
        (text != expected).then(|| env.resolve(ErrorKind::Pattern, &[]))
    })
}

/// Cross-field rule: fails when the value differs from `other`'s value.
///
/// Two absent values are equal.
#[must_use]
pub fn matches(other: impl Into<String>) -> BoxedValidator {
    let other = other.into();
    let label = other.clone();
    cross_field([other.clone()], move |value, dependencies, env| {
        (value != dependencies.get(&other))
            .then(|| env.resolve(ErrorKind::Mismatch, &[("other", label.clone())]))
    })
}

/// Wraps an application rule reporting a [`ErrorKind::Custom`] failure.
///
/// `check` returns `true` when the value is valid.
#[must_use]
pub fn custom<F>(code: &'static str, check: F) -> BoxedValidator
where
    F: Fn(Option<&FieldValue>) -> bool + Send + Sync + 'static,
{
    validator(move |value, env| (!check(value)).then(|| env.resolve(ErrorKind::Custom(code), &[])))
}

fn non_blank_text(value: Option<&FieldValue>) -> Option<&str> {
    value
        .and_then(FieldValue::as_text)
        .filter(|text| !text.trim().is_empty())
}

fn length_of(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::Text(text) if text.is_empty() => None,
        FieldValue::Text(text) => Some(text.chars().count()),
        FieldValue::List(items) => Some(items.len()),
        FieldValue::Integer(_) | FieldValue::Float(_) | FieldValue::Bool(_) => None,
    }
}

fn is_plausible_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if text.chars().any(char::is_whitespace) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }
    labels.last().is_some_and(|tld| tld.chars().count() >= 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::validator::{DependencyValues, ErrorMessage, Validator, ValidatorChain};
    use crate::value::FieldValues;

    fn check(rule: &BoxedValidator, value: Option<FieldValue>) -> Option<ErrorMessage> {
        rule.validate(
            value.as_ref(),
            &DependencyValues::empty(),
            &Environment::default(),
        )
    }

    #[test]
    fn required_rejects_absent_and_blank() {
        let rule = required();
        assert_eq!(check(&rule, None).as_deref(), Some("This field is required"));
        assert!(check(&rule, Some(FieldValue::from("  "))).is_some());
        assert!(check(&rule, Some(FieldValue::List(Vec::new()))).is_some());
        assert!(check(&rule, Some(FieldValue::from("x"))).is_none());
        assert!(check(&rule, Some(FieldValue::from(0))).is_none());
    }

    #[test]
    fn email_heuristic() {
        let rule = email();
        for valid in ["a@b.com", "first.last@sub.example.org"] {
            assert!(check(&rule, Some(FieldValue::from(valid))).is_none(), "{valid}");
        }
        for invalid in [
            "not-an-email",
            "@b.com",
            "a@",
            "a@b",
            "a@b.c",
            "a@@b.com",
            "a b@c.com",
        ] {
            assert_eq!(
                check(&rule, Some(FieldValue::from(invalid))).as_deref(),
                Some("Invalid email address"),
                "{invalid}"
            );
        }
        // Blank is left to `required`.
        assert!(check(&rule, Some(FieldValue::from(""))).is_none());
    }

    #[test]
    fn length_bounds_interpolate_limits() {
        assert_eq!(
            check(&min_length(3), Some(FieldValue::from("ab"))).as_deref(),
            Some("Must be at least 3 characters")
        );
        assert_eq!(
            check(&max_length(2), Some(FieldValue::from("abc"))).as_deref(),
            Some("Must be at most 2 characters")
        );
        assert!(check(&min_length(3), Some(FieldValue::from("abc"))).is_none());
        assert!(
            check(
                &max_length(1),
                Some(FieldValue::List(vec!["a".into(), "b".into()]))
            )
            .is_some()
        );
    }

    #[test]
    fn range_accepts_integers_and_floats() {
        let rule = range(18.0, 120.0);
        assert!(check(&rule, Some(FieldValue::from(30))).is_none());
        assert!(check(&rule, Some(FieldValue::from(17.5))).is_some());
        assert_eq!(
            check(&rule, Some(FieldValue::from(121))).as_deref(),
            Some("Must be between 18 and 120")
        );
        assert!(check(&rule, None).is_none());
    }

    #[test]
    fn pattern_rules() {
        assert!(check(&contains("-"), Some(FieldValue::from("a-b"))).is_none());
        assert_eq!(
            check(&contains("-"), Some(FieldValue::from("ab"))).as_deref(),
            Some("Invalid format")
        );
        assert!(check(&exact("yes"), Some(FieldValue::from("yes"))).is_none());
        assert!(check(&exact("yes"), Some(FieldValue::from("no"))).is_some());
    }

    #[test]
    fn matches_compares_against_dependency() {
        let chain = ValidatorChain::new(vec![matches("password")]);
        assert_eq!(chain.dependent_fields(), ["password"]);

        let mut values = FieldValues::new();
        values.insert("password".into(), Some(FieldValue::from("secret")));
        let env = Environment::default();

        assert!(
            chain
                .run(Some(&FieldValue::from("secret")), &values, &env)
                .is_none()
        );
        assert_eq!(
            chain
                .run(Some(&FieldValue::from("other")), &values, &env)
                .as_deref(),
            Some("Must match password")
        );
    }

    #[test]
    fn custom_uses_its_code() {
        let rule = custom("even", |value| {
            value
                .and_then(FieldValue::as_integer)
                .is_none_or(|n| n % 2 == 0)
        });
        assert!(check(&rule, Some(FieldValue::from(4))).is_none());
        assert_eq!(
            check(&rule, Some(FieldValue::from(3))).as_deref(),
            Some("Invalid value")
        );
    }
}
