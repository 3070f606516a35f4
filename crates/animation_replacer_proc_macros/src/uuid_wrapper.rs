use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Error, Fields, Index, Member, parse_macro_input, spanned::Spanned};

pub(crate) fn uuid_wrapper(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into_token_stream().into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<impl ToTokens> {
    let name = &input.ident;

    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(input, "UuidWrapper can only be derived for structs"));
    };
    let mut fields = data.fields.iter();
    let (Some(field), None) = (fields.next(), fields.next()) else {
        return Err(Error::new(
            data.fields.span(),
            "UuidWrapper expects exactly one field, marked #[uuid]",
        ));
    };
    if !field.attrs.iter().any(|attr| attr.path().is_ident("uuid")) {
        return Err(Error::new_spanned(field, "missing #[uuid] on the wrapped field"));
    }

    let member = match (&data.fields, &field.ident) {
        (Fields::Named(_), Some(ident)) => Member::Named(ident.clone()),
        _ => Member::Unnamed(Index::from(0)),
    };
    let construct = quote! { Self { #member: uuid } };

    Ok(quote! {
        impl ::serde::Serialize for #name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error> {
                ::serde::Serialize::serialize(&self.#member, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for #name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::core::result::Result<Self, D::Error> {
                let uuid = <::uuid::Uuid as ::serde::Deserialize>::deserialize(deserializer)?;
                ::core::result::Result::Ok(#construct)
            }
        }

        impl #name {
            pub fn uuid(&self) -> ::uuid::Uuid {
                self.#member
            }

            /// A fresh random (v4) id.
            pub fn new_random() -> Self {
                let uuid = ::uuid::Uuid::new_v4();
                #construct
            }
        }

        impl ::core::convert::From<::uuid::Uuid> for #name {
            fn from(uuid: ::uuid::Uuid) -> Self {
                #construct
            }
        }

        impl ::core::fmt::Display for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.#member, f)
            }
        }
    })
}
