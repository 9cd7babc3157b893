//! Listener binding rules.
//!
//! A listener routes to exactly one default target group and carries a
//! certificate if and only if its protocol is secure.

use stackcraft_common::ApplicationProtocol;

/// Check the listener's routing and certificate binding.
///
/// Returns the trimmed certificate to attach.
///
/// # Errors
///
/// Returns the offending field and the reason.
pub fn bind(
    protocol: ApplicationProtocol,
    certificate: Option<&str>,
    default_target_groups: usize,
) -> Result<Option<String>, (&'static str, String)> {
    match default_target_groups {
        1 => {}
        0 => {
            return Err((
                "default_target_group",
                "a listener needs one default target group".to_string(),
            ));
        }
        n => {
            return Err((
                "default_target_group",
                format!("{n} default target groups given; routing would be ambiguous"),
            ));
        }
    }

    let certificate = certificate.map(str::trim).filter(|c| !c.is_empty());
    match (protocol.is_secure(), certificate) {
        (true, None) => Err((
            "certificate",
            format!("{protocol} listener requires a non-empty certificate identifier"),
        )),
        (false, Some(_)) => Err((
            "certificate",
            format!("{protocol} listener cannot terminate TLS; drop the certificate or use HTTPS"),
        )),
        (_, cert) => Ok(cert.map(ToString::to_string)),
    }
}
