//! Procedural macros shared by the rastervt crates.
//!
//! The only macro is [`macro@context`], which attaches a formatted message to every error a
//! function returns, so a failure deep inside the tiling pipeline still tells the user which
//! stage it came from.

mod args;

use args::Args;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::{ToTokens, quote};
use syn::{ReturnType, parse_macro_input};

/// Wraps the body of a function returning `anyhow::Result` and adds context to its error.
///
/// The arguments are passed to `format!`, so they may reference the function's parameters:
///
/// ```ignore
/// #[context("reading raster {:?}", path)]
/// fn read(path: &Path) -> Result<Raster> { ... }
/// ```
///
/// Prefix the arguments with `move,` to move captured parameters into the wrapped body.
/// Works for `fn` and `async fn`.
#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let Args(move_token, message) = parse_macro_input!(args);
	let mut function = parse_macro_input!(input as syn::ItemFn);

	let output_type = match &function.sig.output {
		ReturnType::Default => {
			return syn::Error::new_spanned(&function.sig, "#[context] requires a function returning Result")
				.to_compile_error()
				.into();
		}
		ReturnType::Type(_, output_type) => output_type.clone(),
	};

	let body = &function.block;
	let err = Ident::new("err", Span::mixed_site());

	let wrapped = if function.sig.asyncness.is_some() {
		let result = Ident::new("result", Span::mixed_site());
		quote! {
			let #result: #output_type = async #move_token { #body }.await;
			#result.map_err(|#err| #err.context(format!(#message)).into())
		}
	} else {
		// a non-Copy capture forces the closure to be FnOnce
		let once = Ident::new("once", Span::mixed_site());
		quote! {
			let #once = ::core::iter::empty::<()>();
			(#move_token || -> #output_type {
				::core::mem::drop(#once);
				#body
			})().map_err(|#err| #err.context(format!(#message)).into())
		}
	};

	function.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(wrapped), None)];
	function.into_token_stream().into()
}
