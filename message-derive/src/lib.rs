use darling::FromDeriveInput;
use proc_macro::{self, TokenStream};
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Options for a control message: the literal it travels as, and whether
/// the sender appends the `\end` terminator.
#[derive(FromDeriveInput)]
#[darling(attributes(message), supports(struct_unit))]
struct Opts {
    ident: syn::Ident,
    text: String,
    #[darling(default)]
    framed: bool,
}

#[proc_macro_derive(Message, attributes(message))]
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let opts = match Opts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let ident = opts.ident;
    let text = opts.text;
    let mismatch = format!("not a {} message", ident);

    let raw = if opts.framed {
        quote! { crate::codec::encode(#text.as_bytes()) }
    } else {
        quote! { #text.as_bytes().to_vec() }
    };

    let output = quote! {
        impl #ident {
            /// Literal text of this message on the wire.
            pub const TEXT: &'static str = #text;
        }

        impl crate::messages::Message for #ident {
            fn to_raw(&self) -> Vec<u8> {
                #raw
            }

            fn from_raw(payload: &[u8]) -> Result<Self, &'static str> {
                if payload != #text.as_bytes() {
                    return Err(#mismatch);
                }

                Ok(Self)
            }
        }
    };

    output.into()
}
