//! Resource kind naming.

/// Lowercased plural resource name for a `kind`, e.g. `Pod` -> `pods`.
///
/// Kinds whose plural is irregular are listed explicitly; everything else gets
/// a trailing `s`.
#[must_use]
pub fn plural_from_kind(kind: &str) -> String {
    let mut plural = kind.to_lowercase();
    match kind {
        "ComponentStatus" | "Ingress" | "RuntimeClass" | "PriorityClass" | "StorageClass" => {
            plural.push_str("es");
        }
        // ServiceEntry is an Istio kind.
        "NetworkPolicy" | "PodSecurityPolicy" | "ServiceEntry" => {
            plural.pop();
            plural.push_str("ies");
        }
        "Endpoints" => {}
        _ => plural.push('s'),
    }
    plural
}
