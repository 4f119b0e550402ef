/// An authenticated principal.
///
/// Kept minimal so guards and evaluators can work over any user type; role
/// and permission data live on the `RoleBasedIdentity` extension in
/// `mise-security`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Identity`",
    label = "this type cannot be used as an identity",
    note = "implement `Identity` for your type, or use `mise_data::User` which implements it"
)]
pub trait Identity: Send + Sync {
    /// Stable unique identifier.
    fn sub(&self) -> &str;

    fn email(&self) -> Option<&str> {
        None
    }
}
