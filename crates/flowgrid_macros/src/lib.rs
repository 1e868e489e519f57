use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The body is wrapped in a guard that logs the elapsed time on exit when it
/// exceeds the threshold. Without `perf_stats` the guard is not emitted at all.
///
/// # Features
/// - Auto-detects a `grid` parameter (`Res<Grid>`, `ResMut<Grid>`, `&Grid`,
///   `&mut Grid`) and tags the log line with the field revision seen on entry
/// - Default threshold is 1ms
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn process_placement_requests(
///     mut grid: ResMut<Grid>,  // Auto-detected!
///     mut requests: MessageReader<PlacementRequest>,
/// ) {
///     // ... work ...
/// }
/// ```
///
/// # Optional Parameters
/// ```ignore
/// #[profile(4)]  // Custom threshold in milliseconds
/// pub fn update_field(&self, nodes: &mut [Node]) { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let has_grid_param = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        if pat_ident.ident != "grid" {
            return false;
        }
        let ty = &pat_type.ty;
        quote!(#ty).to_string().contains("Grid")
    });

    let guard = if has_grid_param {
        quote! {
            struct ProfileGuard {
                name: &'static str,
                start: std::time::Instant,
                revision: u64,
            }
            impl Drop for ProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() >= #threshold_ms {
                        bevy::prelude::info!(
                            "[PERF] {} (field rev {}): {:?}",
                            self.name, self.revision, elapsed
                        );
                    }
                }
            }
            ProfileGuard {
                name: #fn_name_str,
                start: std::time::Instant::now(),
                revision: grid.revision(),
            }
        }
    } else {
        quote! {
            struct ProfileGuard {
                name: &'static str,
                start: std::time::Instant,
            }
            impl Drop for ProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() >= #threshold_ms {
                        bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                    }
                }
            }
            ProfileGuard {
                name: #fn_name_str,
                start: std::time::Instant::now(),
            }
        }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                #guard
            };

            #block
        }
    };

    output.into()
}
