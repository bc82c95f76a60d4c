//! Bundled protected-domain defaults
//!
//! These domains ship with the engine and are honored regardless of network
//! or sync state. A sync can add to this set but can never remove from it.

/// Crisis-support domains protected out of the box.
pub const BUNDLED_DOMAINS: &[&str] = &[
    // Suicide prevention
    "988lifeline.org",
    "suicidepreventionlifeline.org",
    "crisistextline.org",
    "afsp.org",
    // Domestic violence
    "thehotline.org",
    "loveisrespect.org",
    "womenslaw.org",
    // Child abuse
    "childhelphotline.org",
    "childhelp.org",
    // LGBTQ+ youth
    "thetrevorproject.org",
    "translifeline.org",
    // Sexual assault
    "rainn.org",
    // Substance abuse
    "samhsa.gov",
    "findtreatment.gov",
    // Veterans
    "veteranscrisisline.net",
    // Eating disorders
    "nationaleatingdisorders.org",
    // Runaway / homeless youth
    "1800runaway.org",
];
