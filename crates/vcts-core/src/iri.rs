//! # RFC 3986 Absolute URI Validation
//!
//! The grammar below is a direct regular-expression rendering of the
//! RFC 3986 `URI` production (`scheme ":" hier-part [ "?" query ]
//! [ "#" fragment ]`). Relative references are rejected: a scheme is
//! mandatory, which is exactly what distinguishes an expanded JSON-LD IRI
//! from a term or compact IRI left behind by a missing definition.

use std::sync::OnceLock;

use regex::Regex;

const UNRESERVED: &str = r"A-Za-z0-9\-\._\~";
const SUB_DELIMS: &str = r"!\$\&'\(\)\*\+,;=";
const PCT_ENCODED: &str = r"%[0-9A-Fa-f]{2}";

fn uri_pattern() -> String {
    let pchar = format!(r"(?:[{UNRESERVED}{SUB_DELIMS}:@]|{PCT_ENCODED})");

    let dec_octet = r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9][0-9]|[0-9])";
    let ipv4 = format!(r"(?:{dec_octet}\.{dec_octet}\.{dec_octet}\.{dec_octet})");
    let h16 = r"[0-9A-Fa-f]{1,4}";
    let ls32 = format!(r"(?:{h16}:{h16}|{ipv4})");
    let ipv6 = [
        format!(r"(?:{h16}:){{6}}{ls32}"),
        format!(r"::(?:{h16}:){{5}}{ls32}"),
        format!(r"(?:{h16})?::(?:{h16}:){{4}}{ls32}"),
        format!(r"(?:(?:{h16}:){{0,1}}{h16})?::(?:{h16}:){{3}}{ls32}"),
        format!(r"(?:(?:{h16}:){{0,2}}{h16})?::(?:{h16}:){{2}}{ls32}"),
        format!(r"(?:(?:{h16}:){{0,3}}{h16})?::{h16}:{ls32}"),
        format!(r"(?:(?:{h16}:){{0,4}}{h16})?::{ls32}"),
        format!(r"(?:(?:{h16}:){{0,5}}{h16})?::{h16}"),
        format!(r"(?:(?:{h16}:){{0,6}}{h16})?::"),
    ]
    .join("|");
    let ipvfuture = format!(r"v[0-9A-Fa-f]+\.[{UNRESERVED}{SUB_DELIMS}:]+");
    let ip_literal = format!(r"\[(?:{ipv6}|{ipvfuture})\]");

    let reg_name = format!(r"(?:[{UNRESERVED}{SUB_DELIMS}]|{PCT_ENCODED})*");
    let userinfo = format!(r"(?:[{UNRESERVED}{SUB_DELIMS}:]|{PCT_ENCODED})*");
    let host = format!(r"(?:{ip_literal}|{ipv4}|{reg_name})");
    let authority = format!(r"(?:{userinfo}@)?{host}(?::[0-9]*)?");

    let segment = format!(r"{pchar}*");
    let segment_nz = format!(r"{pchar}+");
    let path_abempty = format!(r"(?:/{segment})*");
    let path_absolute = format!(r"/(?:{segment_nz}(?:/{segment})*)?");
    let path_rootless = format!(r"{segment_nz}(?:/{segment})*");
    let hier_part =
        format!(r"(?://{authority}{path_abempty}|{path_absolute}|{path_rootless}|)");

    let query = format!(r"(?:{pchar}|[/?])*");
    let scheme = r"[A-Za-z][A-Za-z0-9+\-.]*";

    format!(r"^{scheme}:{hier_part}(?:\?{query})?(?:#{query})?$")
}

fn uri_regex() -> Option<&'static Regex> {
    static URI: OnceLock<Option<Regex>> = OnceLock::new();
    URI.get_or_init(|| Regex::new(&uri_pattern()).ok()).as_ref()
}

/// Whether `value` is a syntactically valid absolute URI per RFC 3986.
///
/// `did:example:123`, `urn:uuid:…` and `https://…` all qualify; bare terms
/// (`VerifiableCredential`) and relative references (`/path`, `#frag`) do not.
pub fn is_absolute_uri(value: &str) -> bool {
    uri_regex().is_some_and(|re| re.is_match(value))
}
