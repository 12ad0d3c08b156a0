use std::fmt;

/// A header value supplied by the client or an intermediary.
///
/// Every header value crossing into the engine is wrapped in `Tainted` by the
/// [`HeaderSource`](crate::web::HeaderSource) boundary. Only code inside this
/// crate can unwrap it, and it does so only on the paths that validate and
/// normalize the value (the forwarded-origin extractor and the marker check).
///
/// # Security Properties
///
/// - Does NOT implement `Deref` or any implicit conversion traits
/// - Inner value is inaccessible outside the crate
///
/// # Examples
///
/// ```
/// use origin_gate::Tainted;
///
/// let host = Tainted::new("evil.example.com".to_string());
/// println!("{:?}", host); // Tainted { inner: "evil.example.com" }
///
/// // let raw: String = host; // Won't compile
/// ```
// BREAKING CHANGE WARNING: Do NOT remove Clone - adapters hand out copies of stored headers.
#[derive(Clone)]
pub struct Tainted<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // A public field lets callers treat forwarded headers as trusted without validation.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Extracts the inner value for validation.
    ///
    /// `pub(crate)`: only the extractor and the trust gate may read raw
    /// header values, and both normalize what they read.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// BREAKING CHANGE WARNING: Do NOT add Deref, AsRef, Borrow, From<T>, Into<T>, or any other
// implicit conversion traits to Tainted<T>.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}
