//! Header-reading boundary between host frameworks and the engine.

use std::collections::HashMap;

use crate::Tainted;

/// Read-only view of a request's headers.
///
/// This is the only way the engine reads headers. Implementations should
/// match header names case-insensitively, as HTTP does, and must wrap every
/// value in `Tainted<T>`: forwarded headers are attacker-controlled until the
/// trust gate says otherwise.
///
/// # Design Notes
///
/// This trait intentionally does NOT:
/// - Decide trust (that's `TrustGate`'s job)
/// - Normalize values (that's the forwarded-origin extractor's job)
///
/// It ONLY maps framework header storage to tainted values.
///
/// # Examples
///
/// ```
/// use origin_gate::web::HeaderSource;
/// use origin_gate::Tainted;
///
/// // Example framework-specific implementation
/// struct MyFrameworkRequest {
///     headers: Vec<(String, String)>,
/// }
///
/// impl HeaderSource for MyFrameworkRequest {
///     fn header(&self, name: &str) -> Option<Tainted<String>> {
///         self.headers
///             .iter()
///             .find(|(k, _)| k.eq_ignore_ascii_case(name))
///             .map(|(_, v)| Tainted::new(v.clone()))
///     }
/// }
/// ```
pub trait HeaderSource {
    /// Returns the value of header `name`, if present.
    fn header(&self, name: &str) -> Option<Tainted<String>>;
}

impl HeaderSource for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<Tainted<String>> {
        if let Some(value) = self.get(name) {
            return Some(Tainted::new(value.clone()));
        }
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| Tainted::new(v.clone()))
    }
}

impl<T: HeaderSource + ?Sized> HeaderSource for &T {
    fn header(&self, name: &str) -> Option<Tainted<String>> {
        (**self).header(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashmap_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("x-exposed-by".to_string(), "Expose 1".to_string());

        let value = headers.header("X-Exposed-By").expect("header present");
        assert_eq!(value.into_inner(), "Expose 1");
        assert!(headers.header("X-Forwarded-Host").is_none());
    }

    #[test]
    fn reference_forwards_lookup() {
        let mut headers = HashMap::new();
        headers.insert("X-Forwarded-Host".to_string(), "a.example".to_string());

        let by_ref = &headers;
        assert!(HeaderSource::header(&by_ref, "x-forwarded-host").is_some());
    }
}
