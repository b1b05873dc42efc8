//! Policy rules for owner-level predicates
//!
//! An owner decides whether it is open for comments and who may comment
//! through a [`PolicyRule`]: a fixed boolean, the name of a predicate the
//! owner provides, or a callback. All three shapes are resolved by
//! [`evaluate`].

use crate::types::UserId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Value returned by a policy predicate
///
/// Predicates may answer with any JSON-like value; it is handed back to the
/// caller untouched. `null` and `false` are falsy, everything else is truthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyValue(pub serde_json::Value);

impl PolicyValue {
    pub fn is_truthy(&self) -> bool {
        !matches!(self.0, serde_json::Value::Null | serde_json::Value::Bool(false))
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<bool> for PolicyValue {
    fn from(value: bool) -> Self {
        PolicyValue(serde_json::Value::Bool(value))
    }
}

impl From<&str> for PolicyValue {
    fn from(value: &str) -> Self {
        PolicyValue(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for PolicyValue {
    fn from(value: String) -> Self {
        PolicyValue(serde_json::Value::String(value))
    }
}

impl From<serde_json::Value> for PolicyValue {
    fn from(value: serde_json::Value) -> Self {
        PolicyValue(value)
    }
}

impl PartialEq<bool> for PolicyValue {
    fn eq(&self, other: &bool) -> bool {
        self.0.as_bool() == Some(*other)
    }
}

impl PartialEq<&str> for PolicyValue {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == Some(*other)
    }
}

impl fmt::Display for PolicyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback form of a policy rule
///
/// Receives the author's user id for authorisation checks and `None`
/// otherwise.
pub type PolicyCallback = Arc<dyn Fn(Option<UserId>) -> PolicyValue + Send + Sync>;

/// How an owner-level predicate is decided
#[derive(Clone)]
pub enum PolicyRule {
    /// Fixed answer
    Literal(bool),
    /// Name of a predicate provided by the owner
    MethodRef(String),
    /// Closure supplied at integration time
    Callback(PolicyCallback),
}

impl PolicyRule {
    /// Build a callback rule from a closure
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(Option<UserId>) -> PolicyValue + Send + Sync + 'static,
    {
        PolicyRule::Callback(Arc::new(f))
    }

    /// Build a named-predicate rule
    pub fn method(name: impl Into<String>) -> Self {
        PolicyRule::MethodRef(name.into())
    }
}

impl Default for PolicyRule {
    fn default() -> Self {
        PolicyRule::Literal(true)
    }
}

impl From<bool> for PolicyRule {
    fn from(value: bool) -> Self {
        PolicyRule::Literal(value)
    }
}

impl fmt::Debug for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRule::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            PolicyRule::MethodRef(name) => f.debug_tuple("MethodRef").field(name).finish(),
            PolicyRule::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

// Config files hold either `true`/`false` or a predicate name. Callbacks
// only exist in code and serialize as `true` so a dump stays loadable.
impl Serialize for PolicyRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PolicyRule::Literal(value) => serializer.serialize_bool(*value),
            PolicyRule::MethodRef(name) => serializer.serialize_str(name),
            PolicyRule::Callback(_) => serializer.serialize_bool(true),
        }
    }
}

impl<'de> Deserialize<'de> for PolicyRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RuleHelper {
            Literal(bool),
            MethodRef(String),
        }

        Ok(match RuleHelper::deserialize(deserializer)? {
            RuleHelper::Literal(value) => PolicyRule::Literal(value),
            RuleHelper::MethodRef(name) => PolicyRule::MethodRef(name),
        })
    }
}

/// Something that can answer named policy predicates
pub trait PolicyTarget {
    /// Type tag used in error messages
    fn policy_owner_type(&self) -> String;

    /// Call a named predicate; `None` if the name is unknown
    fn call_predicate(&self, name: &str, user_id: Option<UserId>) -> Option<PolicyValue>;
}

/// Resolve a rule to its value
///
/// `user_id` is forwarded to named predicates and callbacks; callers pass
/// `None` for rules that do not concern the author.
pub fn evaluate(
    rule: &PolicyRule,
    target: &dyn PolicyTarget,
    user_id: Option<UserId>,
) -> crate::Result<PolicyValue> {
    match rule {
        PolicyRule::Literal(value) => Ok(PolicyValue::from(*value)),
        PolicyRule::MethodRef(name) => target.call_predicate(name, user_id).ok_or_else(|| {
            crate::HasCommentsError::UnknownPolicyMethod {
                owner_type: target.policy_owner_type(),
                method: name.clone(),
            }
        }),
        PolicyRule::Callback(callback) => Ok(callback(user_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Post;

    impl PolicyTarget for Post {
        fn policy_owner_type(&self) -> String {
            "Post".to_string()
        }

        fn call_predicate(&self, name: &str, user_id: Option<UserId>) -> Option<PolicyValue> {
            match name {
                "closed" => Some(PolicyValue::from(false)),
                "open?" => Some(PolicyValue::from("foo")),
                "auth?" => Some(PolicyValue::from(user_id == Some(UserId(1)))),
                _ => None,
            }
        }
    }

    #[test]
    fn test_literal_rule() {
        assert_eq!(evaluate(&PolicyRule::Literal(true), &Post, None).unwrap(), true);
        assert_eq!(evaluate(&PolicyRule::Literal(false), &Post, None).unwrap(), false);
    }

    #[test]
    fn test_method_rule_passes_value_through() {
        let value = evaluate(&PolicyRule::method("open?"), &Post, None).unwrap();
        assert_eq!(value, "foo");
        assert!(value.is_truthy());

        let value = evaluate(&PolicyRule::method("closed"), &Post, None).unwrap();
        assert!(!value.is_truthy());
    }

    #[test]
    fn test_method_rule_receives_user_id() {
        let rule = PolicyRule::method("auth?");
        assert_eq!(evaluate(&rule, &Post, Some(UserId(1))).unwrap(), true);
        assert_eq!(evaluate(&rule, &Post, Some(UserId(2))).unwrap(), false);
    }

    #[test]
    fn test_unknown_method() {
        let err = evaluate(&PolicyRule::method("missing"), &Post, None).unwrap_err();
        assert!(matches!(
            err,
            crate::HasCommentsError::UnknownPolicyMethod { ref method, .. } if method == "missing"
        ));
    }

    #[test]
    fn test_callback_rule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let rule = PolicyRule::callback(move |user_id| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert_eq!(user_id, Some(UserId(1)));
            PolicyValue::from("bar")
        });

        let value = evaluate(&rule, &Post, Some(UserId(1))).unwrap();
        assert_eq!(value, "bar");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_truthiness() {
        assert!(PolicyValue::from("yes").is_truthy());
        assert!(PolicyValue::from(serde_json::json!(0)).is_truthy());
        assert!(!PolicyValue::from(serde_json::Value::Null).is_truthy());
        assert!(!PolicyValue::from(false).is_truthy());
    }

    #[test]
    fn test_rule_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            open: PolicyRule,
            authorisation: PolicyRule,
        }

        let holder: Holder = toml::from_str("open = false\nauthorisation = \"member?\"").unwrap();
        assert!(matches!(holder.open, PolicyRule::Literal(false)));
        assert!(matches!(holder.authorisation, PolicyRule::MethodRef(ref m) if m == "member?"));
    }
}
