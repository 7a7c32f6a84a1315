use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, ImplItem, ImplItemFn, ItemImpl, Stmt,
    Variant, Visibility,
};

/// Turns an enum into a loyalty SDK error type.
///
/// The macro:
/// 1. Adds `#[derive(Debug, thiserror::Error, uniffi::Error)]`
/// 2. Adds `#[uniffi(flat_error)]`, unless the macro is invoked as
///    `#[loyalty_error(structured)]`, in which case variant fields stay visible to foreign code
/// 3. Appends a `Generic { message: String }` variant if the enum does not declare one
/// 4. Implements `From<anyhow::Error>`, flattening the cause chain into `message`
///
/// # Usage
///
/// ```rust,ignore
/// #[loyalty_error]
/// pub enum StoreError {
///     #[error("missing key: {key}")]
///     MissingKey { key: String },
/// }
///
/// #[loyalty_error(structured)]
/// pub enum UseCaseError {
///     #[error("api error {code}: {message}")]
///     Api { code: i64, id: Option<String>, message: String },
/// }
/// ```
#[proc_macro_attribute]
pub fn loyalty_error(args: TokenStream, input: TokenStream) -> TokenStream {
    let structured = match parse_error_args(args) {
        Ok(structured) => structured,
        Err(err) => return err.to_compile_error().into(),
    };

    let input = parse_macro_input!(input as DeriveInput);

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(&input, "loyalty_error can only be applied to enums")
            .to_compile_error()
            .into();
    };

    let enum_name = &input.ident;
    let visibility = &input.vis;
    let generics = &input.generics;

    // Derives and uniffi attributes are owned by the macro.
    let attrs: Vec<_> = input
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("derive") && !attr.path().is_ident("uniffi"))
        .collect();

    let mut variants = data_enum.variants.clone();
    if !variants.iter().any(|variant| variant.ident == "Generic") {
        let generic_variant: Variant = syn::parse_quote! {
            /// Any other failure, carrying the flattened error chain.
            #[error("Generic error: {message}")]
            Generic {
                /// The error message, including its causes.
                message: String
            }
        };
        variants.push(generic_variant);
    }

    let flat_attr = if structured {
        quote! {}
    } else {
        quote! { #[uniffi(flat_error)] }
    };

    quote! {
        #[derive(Debug, thiserror::Error, uniffi::Error)]
        #flat_attr
        #(#attrs)*
        #visibility enum #enum_name #generics {
            #variants
        }

        impl #generics From<anyhow::Error> for #enum_name #generics {
            fn from(err: anyhow::Error) -> Self {
                let mut message = err.to_string();
                let chain: Vec<String> = err.chain().skip(1).map(|e| e.to_string()).collect();
                if !chain.is_empty() {
                    message.push_str(" (caused by: ");
                    message.push_str(&chain.join(" -> "));
                    message.push(')');
                }
                Self::Generic { message }
            }
        }
    }
    .into()
}

/// Accepts either no arguments or the single flag `structured`.
fn parse_error_args(args: TokenStream) -> syn::Result<bool> {
    if args.is_empty() {
        return Ok(false);
    }
    let ident: syn::Ident = syn::parse(args)?;
    if ident == "structured" {
        Ok(true)
    } else {
        Err(syn::Error::new_spanned(
            ident,
            "expected `structured` or no arguments",
        ))
    }
}

/// Wraps `uniffi::export` and scopes the SDK logging context to the exported type.
///
/// The macro:
/// 1. Forwards its arguments to `#[uniffi::export]`
/// 2. Inserts `let _loyalty_logger_ctx = crate::primitives::logger::LogContext::new("TypeName");`
///    at the start of every `pub fn`
/// 3. Adds `async_runtime = "tokio"` when any public method is async
///
/// # Usage
///
/// ```rust,ignore
/// #[loyalty_export]
/// impl CampaignUseCase {
///     pub async fn detail(&self, campaign_id: i64) -> Result<CampaignDetail, UseCaseError> {
///         debug!("fetching {campaign_id}"); // logged as "[Loyalty][CampaignUseCase] fetching 1"
///         todo!()
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn loyalty_export(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item = parse_macro_input!(input as ItemImpl);

    let scope = scope_name(&item.self_ty);
    let is_async = exports_async(&item.items);

    for impl_item in &mut item.items {
        if let ImplItem::Fn(method) = impl_item {
            if matches!(method.vis, Visibility::Public(_)) {
                scope_logs_to(method, &scope);
            }
        }
    }

    let args = export_args(proc_macro2::TokenStream::from(args), is_async);

    quote! {
        #[uniffi::export(#args)]
        #item
    }
    .into()
}

/// Last path segment of the implementing type, e.g. `CartUseCase` for `crate::cart::CartUseCase`.
fn scope_name(self_ty: &syn::Type) -> String {
    let syn::Type::Path(path) = self_ty else {
        return "Unknown".to_string();
    };
    path.path
        .segments
        .last()
        .map_or_else(|| "Unknown".to_string(), |segment| segment.ident.to_string())
}

/// Appends the tokio runtime to the export arguments when needed.
fn export_args(
    args: proc_macro2::TokenStream,
    is_async: bool,
) -> proc_macro2::TokenStream {
    match (is_async, args.is_empty()) {
        (false, _) => args,
        (true, true) => quote! { async_runtime = "tokio" },
        (true, false) => quote! { #args, async_runtime = "tokio" },
    }
}

/// Whether any exported (public) method is `async`.
fn exports_async(items: &[ImplItem]) -> bool {
    items.iter().any(|item| {
        matches!(
            item,
            ImplItem::Fn(method)
                if matches!(method.vis, Visibility::Public(_)) && method.sig.asyncness.is_some()
        )
    })
}

fn scope_logs_to(method: &mut ImplItemFn, scope: &str) {
    let guard: Stmt = syn::parse_quote! {
        let _loyalty_logger_ctx = crate::primitives::logger::LogContext::new(#scope);
    };
    method.block.stmts.insert(0, guard);
}
