//! Common wire types and serde helpers for the Galaxy API

use serde::Deserialize;

/// One page of a list endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Token for the following page; empty tokens end iteration too
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// Joins a collection path and an id, escaping the id as one path segment
pub fn entity_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}

/// Integer fields the API sometimes renders as `5.0` or `"5"`.
///
/// Values with a fractional part are rejected rather than truncated.
pub mod lossless_int {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntLike {
        Int(i64),
        Float(f64),
        String(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<IntLike>::deserialize(deserializer)? {
            None => Ok(None),
            Some(IntLike::Int(i)) => Ok(Some(i)),
            Some(IntLike::Float(f)) => to_i64(f).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("expected an integer, got {}", f))
            }),
            Some(IntLike::String(s)) => {
                if let Ok(i) = s.trim().parse::<i64>() {
                    return Ok(Some(i));
                }
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(to_i64)
                    .map(Some)
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!("expected an integer, got '{}'", s))
                    })
            }
        }
    }

    fn to_i64(f: f64) -> Option<i64> {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Workers {
        #[serde(default, deserialize_with = "lossless_int::deserialize")]
        count: Option<i64>,
    }

    #[test]
    fn lossless_int_accepts_integer_shapes() {
        for body in [
            r#"{"count": 5}"#,
            r#"{"count": 5.0}"#,
            r#"{"count": "5"}"#,
        ] {
            let w: Workers = serde_json::from_str(body).unwrap();
            assert_eq!(w.count, Some(5), "{}", body);
        }
    }

    #[test]
    fn lossless_int_handles_absent_and_null() {
        let w: Workers = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(w.count, None);
        let w: Workers = serde_json::from_str(r#"{"count": null}"#).unwrap();
        assert_eq!(w.count, None);
    }

    #[test]
    fn lossless_int_rejects_fractions() {
        assert!(serde_json::from_str::<Workers>(r#"{"count": 5.5}"#).is_err());
        assert!(serde_json::from_str::<Workers>(r#"{"count": "five"}"#).is_err());
    }

    #[test]
    fn page_token_handling() {
        let page: Page<String> =
            serde_json::from_str(r#"{"result": ["a"], "nextPageToken": ""}"#).unwrap();
        assert_eq!(page.next_token(), None);

        let page: Page<String> =
            serde_json::from_str(r#"{"result": [], "nextPageToken": "t2"}"#).unwrap();
        assert_eq!(page.next_token(), Some("t2"));

        let page: Page<String> = serde_json::from_str(r#"{}"#).unwrap();
        assert!(page.result.is_empty());
        assert_eq!(page.next_token(), None);
    }

    #[test]
    fn query_params_are_encoded() {
        let params = ApiQueryParams::new()
            .add("pageSize", 100)
            .add_optional("pageToken", Some("a b/c"))
            .add_optional::<_, String>("missing", None);
        assert_eq!(params.to_query_string(), "?pageSize=100&pageToken=a%20b%2Fc");
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
    }

    #[test]
    fn entity_path_escapes_id() {
        assert_eq!(entity_path("cluster", "w-1"), "cluster/w-1");
        assert_eq!(entity_path("role", "a/b"), "role/a%2Fb");
    }
}
