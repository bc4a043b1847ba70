//! Name completion against a statement's scope.

use std::sync::Arc;

use reckon_eval::builtins::lookup_builtin;
use reckon_eval::value::BoundMethod;
use reckon_eval::{has_method, method_names, Scope, Value};
use reckon_lexer::CompletionQuery;
use rustc_hash::FxHashSet;

/// One completion candidate.
#[derive(Clone, Debug)]
pub struct Completion {
    /// The full name.
    pub display: String,
    /// What to insert after the text already typed.
    pub insert: String,
    /// The object the name refers to, when known.
    pub value: Option<Value>,
}

/// Resolve a dotted name path: the first name in `scope` or the builtins,
/// the rest as attributes.
pub(crate) fn resolve_path(scope: &Scope, names: &[String]) -> Option<Value> {
    let (first, rest) = names.split_first()?;
    let mut value = scope.get(first).cloned().or_else(|| lookup_builtin(first))?;
    for name in rest {
        value = attribute(&value, name)?;
    }
    Some(value)
}

fn attribute(value: &Value, name: &str) -> Option<Value> {
    if let Value::Namespace(ns) = value {
        if let Some(attr) = ns.lock().get(name) {
            return Some(attr.clone());
        }
    }
    has_method(value, name).then(|| {
        Value::BoundMethod(Arc::new(BoundMethod {
            receiver: value.clone(),
            name: name.into(),
        }))
    })
}

fn attribute_names(value: &Value) -> Vec<String> {
    let mut names: Vec<String> = match value {
        Value::Namespace(ns) => ns.lock().keys().cloned().collect(),
        _ => Vec::new(),
    };
    names.extend(method_names(value).iter().map(|m| (*m).to_owned()));
    names
}

/// Private names sort after public ones, dunders last.
fn rank(name: &str) -> u8 {
    if name.starts_with("__") {
        2
    } else {
        u8::from(name.starts_with('_'))
    }
}

/// Candidates for `query`, looking names up in `scope` and then in
/// `builtins`.
pub(crate) fn complete(query: &CompletionQuery, scope: &Scope, builtins: &[&str]) -> Vec<Completion> {
    let (prefix, candidates): (&str, Vec<(String, Option<Value>)>) = match query {
        CompletionQuery::Nothing => return Vec::new(),
        CompletionQuery::Scope { prefix } => {
            let names = scope
                .iter()
                .map(|(name, value)| (name.to_owned(), Some(value.clone())))
                .chain(
                    builtins
                        .iter()
                        .map(|name| ((*name).to_owned(), lookup_builtin(name))),
                )
                .collect();
            (prefix, names)
        }
        CompletionQuery::Attribute { base, prefix } => {
            let Some(object) = resolve_path(scope, base) else {
                return Vec::new();
            };
            let names = attribute_names(&object)
                .into_iter()
                .map(|name| {
                    let value = attribute(&object, &name);
                    (name, value)
                })
                .collect();
            (prefix, names)
        }
    };

    let mut seen = FxHashSet::default();
    let mut completions: Vec<Completion> = candidates
        .into_iter()
        .filter(|(name, _)| name.starts_with(prefix) && name.len() > prefix.len())
        .filter(|(name, _)| seen.insert(name.clone()))
        .map(|(name, value)| Completion {
            insert: name[prefix.len()..].to_owned(),
            display: name,
            value,
        })
        .collect();
    completions.sort_by(|a, b| {
        rank(&a.display)
            .cmp(&rank(&b.display))
            .then_with(|| a.display.cmp(&b.display))
    });
    completions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reckon_eval::value::Namespace;

    fn scope() -> Scope {
        let mut scope = Scope::new();
        scope.set("alpha", Value::Int(1));
        scope.set("alps", Value::Int(2));
        scope.set("_hidden", Value::Int(3));
        scope.set("__dunder", Value::Int(4));
        let mut attrs = Namespace::new();
        attrs.insert("width".to_owned(), Value::Int(5));
        attrs.insert("weight".to_owned(), Value::Int(6));
        scope.set("box", Value::namespace(attrs));
        scope
    }

    fn displays(completions: &[Completion]) -> Vec<&str> {
        completions.iter().map(|c| c.display.as_str()).collect()
    }

    #[test]
    fn scope_prefix() {
        let query = CompletionQuery::Scope {
            prefix: "al".to_owned(),
        };
        let completions = complete(&query, &scope(), &["all", "abs"]);
        assert_eq!(displays(&completions), vec!["all", "alpha", "alps"]);
        assert_eq!(completions[1].insert, "pha");
    }

    #[test]
    fn private_names_sort_last() {
        let query = CompletionQuery::Scope {
            prefix: String::new(),
        };
        let completions = complete(&query, &scope(), &[]);
        assert_eq!(
            displays(&completions),
            vec!["alpha", "alps", "box", "_hidden", "__dunder"]
        );
    }

    #[test]
    fn scope_names_shadow_builtins() {
        let mut scope = Scope::new();
        scope.set("len", Value::Int(7));
        let query = CompletionQuery::Scope {
            prefix: "le".to_owned(),
        };
        let completions = complete(&query, &scope, &["len"]);
        assert_eq!(completions.len(), 1);
        assert!(matches!(completions[0].value, Some(Value::Int(7))));
    }

    #[test]
    fn namespace_attributes() {
        let query = CompletionQuery::Attribute {
            base: vec!["box".to_owned()],
            prefix: "w".to_owned(),
        };
        let completions = complete(&query, &scope(), &[]);
        assert_eq!(displays(&completions), vec!["weight", "width"]);
    }

    #[test]
    fn methods_of_builtin_types() {
        let mut scope = Scope::new();
        scope.set("s", Value::Str("abc".into()));
        let query = CompletionQuery::Attribute {
            base: vec!["s".to_owned()],
            prefix: "up".to_owned(),
        };
        let completions = complete(&query, &scope, &[]);
        assert_eq!(displays(&completions), vec!["upper"]);
        assert!(matches!(completions[0].value, Some(Value::BoundMethod(_))));
    }

    #[test]
    fn unknown_base_completes_nothing() {
        let query = CompletionQuery::Attribute {
            base: vec!["missing".to_owned()],
            prefix: String::new(),
        };
        assert!(complete(&query, &scope(), &[]).is_empty());
    }

    #[test]
    fn resolve_dotted_path() {
        let value = resolve_path(&scope(), &["box".to_owned(), "width".to_owned()]);
        assert!(matches!(value, Some(Value::Int(5))));
        assert!(resolve_path(&scope(), &["box".to_owned(), "depth".to_owned()]).is_none());
        assert!(matches!(
            resolve_path(&Scope::new(), &["len".to_owned()]),
            Some(Value::Builtin(_))
        ));
    }
}
