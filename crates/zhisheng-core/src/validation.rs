//! # Validation Module
//!
//! Form validation for storefront pages (address forms, prescription
//! questionnaires, login).
//!
//! ## Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RuleSet (ordered)                                                      │
//! │                                                                         │
//! │  phone ──► [required] ──► [phone]          first failure is recorded,   │
//! │  email ──► [email]                         remaining rules of that      │
//! │  name  ──► [required] ──► [maxLength 20]   field are skipped            │
//! │                                                                         │
//! │  Result: { valid: false, errors: { phone: "请输入正确的手机号" } }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are data, never errors: `validate` always returns a
//! [`ValidationReport`].
//!
//! ## Usage
//! ```rust
//! use std::collections::HashMap;
//! use zhisheng_core::validation::{validate, Rule, RuleSet};
//!
//! let rules = RuleSet::new().field("phone", vec![Rule::required(), Rule::phone()]);
//!
//! let mut form = HashMap::new();
//! form.insert("phone".to_string(), "12345".to_string());
//!
//! let report = validate(&form, &rules);
//! assert!(!report.is_valid());
//! assert_eq!(report.error("phone"), Some("请输入正确的手机号"));
//! ```

use regex::Regex;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

// =============================================================================
// Built-in Predicates
// =============================================================================

/// Stand-alone predicates, usable outside a [`RuleSet`].
pub mod rules {
    use super::*;

    fn phone_pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| Regex::new(r"^1[3-9][0-9]{9}$").expect("valid phone pattern"))
    }

    fn email_pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern")
        })
    }

    fn id_card_pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(
                r"^[1-9][0-9]{5}(18|19|20)[0-9]{2}(0[1-9]|1[0-2])(0[1-9]|[12][0-9]|3[01])[0-9]{3}([0-9]|X|x)$",
            )
            .expect("valid id card pattern")
        })
    }

    /// Present and non-empty.
    pub fn required(value: Option<&str>) -> bool {
        matches!(value, Some(v) if !v.is_empty())
    }

    /// Mainland mobile number: 11 ASCII digits, `1` then `3`-`9`.
    pub fn phone(value: Option<&str>) -> bool {
        value.is_some_and(|v| phone_pattern().is_match(v))
    }

    /// Loose `local@domain.tld` shape.
    pub fn email(value: Option<&str>) -> bool {
        value.is_some_and(|v| email_pattern().is_match(v))
    }

    /// 18-character mainland resident ID (pattern only, checksum not verified).
    pub fn id_card(value: Option<&str>) -> bool {
        value.is_some_and(|v| id_card_pattern().is_match(v))
    }

    /// At least `min` characters; a missing value fails.
    pub fn min_length(value: Option<&str>, min: usize) -> bool {
        value.is_some_and(|v| v.chars().count() >= min)
    }

    /// At most `max` characters; a missing value passes.
    pub fn max_length(value: Option<&str>, max: usize) -> bool {
        value.map_or(true, |v| v.chars().count() <= max)
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Caller-supplied predicate for [`RuleKind::Custom`].
pub type Predicate = Box<dyn Fn(Option<&str>) -> bool + Send + Sync>;

/// The check a [`Rule`] performs.
pub enum RuleKind {
    Required,
    Phone,
    Email,
    IdCard,
    MinLength(usize),
    MaxLength(usize),
    Custom(Predicate),
}

impl RuleKind {
    /// Stable name, matching the rule `type` strings page scripts use.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Phone => "phone",
            RuleKind::Email => "email",
            RuleKind::IdCard => "idCard",
            RuleKind::MinLength(_) => "minLength",
            RuleKind::MaxLength(_) => "maxLength",
            RuleKind::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::MinLength(n) => write!(f, "MinLength({})", n),
            RuleKind::MaxLength(n) => write!(f, "MaxLength({})", n),
            other => f.write_str(other.name()),
        }
    }
}

/// One check plus the message shown when it fails.
#[derive(Debug)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Rule {
            kind,
            message: None,
        }
    }

    pub fn required() -> Self {
        Rule::new(RuleKind::Required)
    }

    pub fn phone() -> Self {
        Rule::new(RuleKind::Phone)
    }

    pub fn email() -> Self {
        Rule::new(RuleKind::Email)
    }

    pub fn id_card() -> Self {
        Rule::new(RuleKind::IdCard)
    }

    pub fn min_length(min: usize) -> Self {
        Rule::new(RuleKind::MinLength(min))
    }

    pub fn max_length(max: usize) -> Self {
        Rule::new(RuleKind::MaxLength(max))
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        Rule::new(RuleKind::Custom(Box::new(predicate)))
    }

    /// Overrides the default failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Runs the check against a field value (`None` = field missing).
    pub fn check(&self, value: Option<&str>) -> bool {
        match &self.kind {
            RuleKind::Required => rules::required(value),
            RuleKind::Phone => rules::phone(value),
            RuleKind::Email => rules::email(value),
            RuleKind::IdCard => rules::id_card(value),
            RuleKind::MinLength(min) => rules::min_length(value, *min),
            RuleKind::MaxLength(max) => rules::max_length(value, *max),
            RuleKind::Custom(predicate) => predicate(value),
        }
    }

    /// The message reported on failure: the override, else the default copy.
    pub fn message(&self) -> Cow<'_, str> {
        if let Some(message) = &self.message {
            return Cow::Borrowed(message);
        }

        match &self.kind {
            RuleKind::Required => Cow::Borrowed("此项为必填项"),
            RuleKind::Phone => Cow::Borrowed("请输入正确的手机号"),
            RuleKind::Email => Cow::Borrowed("请输入正确的邮箱地址"),
            RuleKind::IdCard => Cow::Borrowed("请输入正确的身份证号"),
            RuleKind::MinLength(min) => Cow::Owned(format!("长度不能少于{}个字符", min)),
            RuleKind::MaxLength(max) => Cow::Owned(format!("长度不能超过{}个字符", max)),
            RuleKind::Custom(_) => Cow::Borrowed("验证失败"),
        }
    }
}

/// Ordered mapping of field name to its ordered rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Adds rules for a field. Rules for a field already present are appended
    /// to its list, keeping the field's original position.
    pub fn field(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.push(name, rules);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, rules: Vec<Rule>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => existing.extend(rules),
            None => self.fields.push((name, rules)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields.iter().map(|(f, r)| (f.as_str(), r.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// Form Values
// =============================================================================

/// Anything a form's field values can be read from.
pub trait FormValues {
    /// The field's value, `None` when the field is missing.
    fn value(&self, field: &str) -> Option<&str>;
}

impl FormValues for HashMap<String, String> {
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(String::as_str)
    }
}

impl FormValues for BTreeMap<String, String> {
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(String::as_str)
    }
}

impl FormValues for [(&str, &str)] {
    fn value(&self, field: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == field).map(|(_, v)| *v)
    }
}

impl<const N: usize> FormValues for [(&str, &str); N] {
    fn value(&self, field: &str) -> Option<&str> {
        self.as_slice().value(field)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Outcome of [`validate`].
///
/// Serializes as `{"valid": bool, "errors": {field: message}}` with fields in
/// rule-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<(String, String)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message recorded for a field, if it failed.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    /// Failed fields and their messages, in rule-set order.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// First failure, handy for a single toast.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|(_, m)| m.as_str())
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

struct ErrorMap<'a>(&'a [(String, String)]);

impl Serialize for ErrorMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in self.0 {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut report = serializer.serialize_struct("ValidationReport", 2)?;
        report.serialize_field("valid", &self.is_valid())?;
        report.serialize_field("errors", &ErrorMap(&self.errors))?;
        report.end()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Validates a form against a rule set.
///
/// Fields are visited in rule-set order; within a field, rules run in order
/// and the first failure is recorded.
pub fn validate<F>(form: &F, rules: &RuleSet) -> ValidationReport
where
    F: FormValues + ?Sized,
{
    let mut report = ValidationReport::default();

    for (field, field_rules) in rules.fields() {
        let value = form.value(field);
        if let Some(failed) = field_rules.iter().find(|rule| !rule.check(value)) {
            report
                .errors
                .push((field.to_string(), failed.message().into_owned()));
        }
    }

    report
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_rule() {
        let rules = RuleSet::new().field("phone", vec![Rule::phone()]);

        let report = validate(&[("phone", "12345")], &rules);
        assert!(!report.is_valid());
        assert_eq!(report.error("phone"), Some("请输入正确的手机号"));

        let report = validate(&[("phone", "13800138000")], &rules);
        assert!(report.is_valid());
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn test_phone_predicate() {
        assert!(rules::phone(Some("19912345678")));
        assert!(!rules::phone(Some("12800138000"))); // second digit 2
        assert!(!rules::phone(Some("1380013800"))); // 10 digits
        assert!(!rules::phone(Some("138001380001")));
        assert!(!rules::phone(None));
    }

    #[test]
    fn test_phone_rejects_non_ascii_digits() {
        // Arabic-Indic and full-width digits
        assert!(!rules::phone(Some("13٨٠٠١٣٨٠٠٠")));
        assert!(!rules::phone(Some("１３８００１３８０００")));
        assert!(!rules::phone(Some("1380013800０")));

        let rules = RuleSet::new().field("phone", vec![Rule::required(), Rule::phone()]);
        let report = validate(&[("phone", "13٨٠٠١٣٨٠٠٠")], &rules);
        assert!(!report.is_valid());
        assert_eq!(report.error("phone"), Some("请输入正确的手机号"));
    }

    #[test]
    fn test_id_card_rejects_non_ascii_digits() {
        assert!(!rules::id_card(Some("11010519491231002٣")));
        assert!(!rules::id_card(Some("１10105194912310021")));
        assert!(!rules::id_card(Some("1101051949123１0021")));
    }

    #[test]
    fn test_required() {
        assert!(rules::required(Some("x")));
        assert!(rules::required(Some(" ")));
        assert!(!rules::required(Some("")));
        assert!(!rules::required(None));
    }

    #[test]
    fn test_email_and_id_card() {
        assert!(rules::email(Some("a@b.cn")));
        assert!(!rules::email(Some("a@b")));
        assert!(!rules::email(Some("a b@c.cn")));

        assert!(rules::id_card(Some("11010519491231002X")));
        assert!(rules::id_card(Some("110105194912310021")));
        assert!(rules::id_card(Some("11010519491231002x")));
        assert!(!rules::id_card(Some("01010519491231002X"))); // leading 0
        assert!(!rules::id_card(Some("110105194913310021"))); // month 13
        assert!(!rules::id_card(Some("11010517491231002X"))); // century 17
    }

    #[test]
    fn test_length_bounds_count_characters() {
        assert!(rules::min_length(Some("张三"), 2));
        assert!(!rules::min_length(Some("张"), 2));
        assert!(!rules::min_length(None, 0));

        assert!(rules::max_length(Some("张三丰"), 3));
        assert!(!rules::max_length(Some("张三丰!"), 3));
        assert!(rules::max_length(None, 3));
    }

    #[test]
    fn test_first_failure_per_field_wins() {
        let rules = RuleSet::new().field(
            "phone",
            vec![
                Rule::required().with_message("请填写手机号"),
                Rule::phone(),
            ],
        );

        let report = validate(&[("other", "x")], &rules);
        assert_eq!(report.error("phone"), Some("请填写手机号"));

        let report = validate(&[("phone", "abc")], &rules);
        assert_eq!(report.error("phone"), Some("请输入正确的手机号"));
    }

    #[test]
    fn test_fields_reported_in_rule_order() {
        let rules = RuleSet::new()
            .field("name", vec![Rule::required()])
            .field("email", vec![Rule::email()])
            .field("nickname", vec![Rule::max_length(4)]);

        let form: HashMap<String, String> = [("email", "bad"), ("nickname", "abcdef")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let report = validate(&form, &rules);
        let fields: Vec<&str> = report.errors().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["name", "email", "nickname"]);
        assert_eq!(report.first_error(), Some("此项为必填项"));
        assert_eq!(report.error("nickname"), Some("长度不能超过4个字符"));
    }

    #[test]
    fn test_custom_rule() {
        let rules = RuleSet::new().field(
            "confirm",
            vec![Rule::custom(|v| v == Some("123456")).with_message("两次密码不一致")],
        );

        assert!(validate(&[("confirm", "123456")], &rules).is_valid());
        let report = validate(&[("confirm", "654321")], &rules);
        assert_eq!(report.error("confirm"), Some("两次密码不一致"));

        let rules = RuleSet::new().field("x", vec![Rule::custom(|_| false)]);
        assert_eq!(validate(&[("x", "")], &rules).error("x"), Some("验证失败"));
    }

    #[test]
    fn test_pushing_existing_field_appends_rules() {
        let mut rules = RuleSet::new().field("a", vec![Rule::required()]);
        rules.push("b", vec![Rule::required()]);
        rules.push("a", vec![Rule::min_length(3)]);

        let fields: Vec<(&str, usize)> = rules.fields().map(|(f, r)| (f, r.len())).collect();
        assert_eq!(fields, vec![("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_report_serialization() {
        let rules = RuleSet::new()
            .field("phone", vec![Rule::phone()])
            .field("name", vec![Rule::required()]);

        let report = validate(&[("phone", "12345"), ("name", "王")], &rules);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"valid": false, "errors": {"phone": "请输入正确的手机号"}})
        );

        let ok = validate(&[("phone", "13800138000"), ("name", "王")], &rules);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"valid": true, "errors": {}})
        );
    }
}
