use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Field, Fields, Ident, LitStr, Path};

pub fn derive_bindable(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

enum Role {
    Member(String),
    Base,
    Notifier,
    Skip,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => {
                return Ok(quote! {
                    impl #impl_generics ::bound_rust::Bindable for #name #ty_generics #where_clause {
                        fn members(members: ::bound_rust::Members<Self>) -> ::bound_rust::Members<Self> {
                            members
                        }
                    }
                })
            }
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Bindable derive: tuple structs have no member names",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Bindable derive: only structs with named fields are supported",
            ))
        }
    };

    let mut registrations = Vec::new();
    let mut notifier: Option<Ident> = None;
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        match field_role(field, ident)? {
            Role::Skip => {}
            Role::Member(member) => registrations.push(quote! {
                .field(
                    #member,
                    |this: &Self| &this.#ident,
                    |this: &mut Self| &mut this.#ident,
                )
            }),
            Role::Base => registrations.push(quote! {
                .inherit(|this: &Self| &this.#ident, |this: &mut Self| &mut this.#ident)
            }),
            Role::Notifier => {
                if notifier.is_some() {
                    return Err(syn::Error::new_spanned(
                        ident,
                        "Bindable derive: only one field may be #[bind(notifier)]",
                    ));
                }
                notifier = Some(ident.clone());
            }
        }
    }

    let body = match struct_extension(input)? {
        Some(extend) => quote! { #extend(members #(#registrations)*) },
        None => quote! { members #(#registrations)* },
    };

    let notification_source = notifier.map(|ident| {
        quote! {
            fn notification_source(&self) -> Option<&dyn ::bound_rust::NotificationSource> {
                Some(&self.#ident)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::bound_rust::Bindable for #name #ty_generics #where_clause {
            fn members(members: ::bound_rust::Members<Self>) -> ::bound_rust::Members<Self> {
                #body
            }

            #notification_source
        }
    })
}

fn field_role(field: &Field, ident: &Ident) -> syn::Result<Role> {
    let mut role = Role::Member(ident.unraw().to_string());
    for attr in &field.attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                role = Role::Skip;
            } else if meta.path.is_ident("base") {
                role = Role::Base;
            } else if meta.path.is_ident("notifier") {
                role = Role::Notifier;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                role = Role::Member(value.value());
            } else {
                return Err(meta.error("expected `skip`, `base`, `notifier` or `rename = \"...\"`"));
            }
            Ok(())
        })?;
    }
    Ok(role)
}

fn struct_extension(input: &DeriveInput) -> syn::Result<Option<Path>> {
    let mut extend = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("extend") {
                let value: LitStr = meta.value()?.parse()?;
                extend = Some(value.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("expected `extend = \"path\"`"))
            }
        })?;
    }
    Ok(extend)
}
