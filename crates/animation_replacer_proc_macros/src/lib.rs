mod uuid_wrapper;

use proc_macro::TokenStream;

use crate::uuid_wrapper::uuid_wrapper;

/// Implements serde, a `uuid()` accessor, `new_random()` and `From<Uuid>` for a struct
/// wrapping a single `#[uuid]` field.
#[proc_macro_derive(UuidWrapper, attributes(uuid))]
pub fn derive_uuid_wrapper(input: TokenStream) -> TokenStream {
    uuid_wrapper(input)
}
