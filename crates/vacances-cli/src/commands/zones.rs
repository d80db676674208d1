//! `vacances zones`: lists the zone labels accepted by `--zone` and in
//! `[[entries]]`.

use vacances_core::Zone;

use crate::error::CliResult;

/// Print every zone, metropolitan zones first.
pub fn zones() -> CliResult<()> {
    print!("{}", render());
    Ok(())
}

fn render() -> String {
    let mut out = String::new();
    for zone in Zone::ALL {
        let kind = if zone.is_metropolitan() {
            "metropolitan"
        } else {
            "overseas/other"
        };
        out.push_str(&format!("{:<26} {}\n", zone.as_str(), kind));
    }
    out
}
