//! Compute the `X-Signature` header value for a webhook body.
//!
//! Usage: `sign <secret> <body>`, or `sign <body>` with `WEBHOOK_SECRET` set
//! (a `.env` file is honored).

use mi_server::ingest::signing::sign_payload;

const USAGE: &str = "Usage: sign <secret> <body>\n       WEBHOOK_SECRET=<secret> sign <body>";

fn main() {
    dotenvy::dotenv().ok();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let Some((secret, body)) = secret_and_body(&args, std::env::var("WEBHOOK_SECRET").ok())
    else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    println!("{}", sign_payload(&secret, body.as_bytes()));
}

/// Two arguments are `<secret> <body>`; one argument is the body signed with
/// the environment secret. An empty secret never signs.
fn secret_and_body(args: &[String], env_secret: Option<String>) -> Option<(String, &str)> {
    let (secret, body) = match args {
        [secret, body] => (secret.clone(), body.as_str()),
        [body] => (env_secret?, body.as_str()),
        _ => return None,
    };
    (!secret.is_empty()).then_some((secret, body))
}
