//! The per-request context hooks observe.

/// Request context handed to event hooks by the host framework.
///
/// Label resolution reads the optional identity fields; the signalling
/// operations belong to the host's request API and are exposed here so a
/// handler can participate in request processing the same way any other
/// host extension does.
pub trait RequestContext {
    /// Authenticated user identifier, if the request carries one.
    fn user_id(&self) -> Option<String>;

    /// Tenant subdomain resolved from the request's auth info, if any.
    fn subdomain(&self) -> Option<String>;

    /// Abort the current operation with a status code and message.
    fn reject(&self, code: u16, message: &str);

    /// Attach an informational message to the current request.
    fn info(&self, message: &str);
}
