mod bindable;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Bindable)] derive macro
// ============================================================================

/// Derive macro for the `Bindable` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Default, Bindable)]
/// #[bind(extend = "text_view_methods")]
/// struct TextView {
///     #[bind(base)]
///     widget: Widget,
///     text: String,
///     #[bind(rename = "hint")]
///     placeholder: String,
///     #[bind(skip)]
///     cache: Vec<u8>,
///     #[bind(notifier)]
///     changes: Notifier,
/// }
///
/// fn text_view_methods(members: Members<TextView>) -> Members<TextView> {
///     members.getter("get_length", |v: &TextView| v.text.len() as i64)
/// }
/// ```
///
/// - Every named field becomes a field member under its own name.
/// - `#[bind(rename = "...")]` registers the field under another name.
/// - `#[bind(skip)]` leaves the field out.
/// - `#[bind(base)]` takes over all members of an embedded `Bindable`.
/// - `#[bind(notifier)]` marks the field returned by `notification_source`
///   (the field itself is not a member).
/// - `#[bind(extend = "path")]` on the struct appends hand-written members
///   from a `fn(Members<Self>) -> Members<Self>`.
#[proc_macro_derive(Bindable, attributes(bind))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    bindable::derive_bindable(input)
}
