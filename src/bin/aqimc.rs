//! AQIMC CLI
//!
//! Usage:
//!   aqimc encrypt --text <TEXT> [--key1 K] [--key2 K] [--key3 K] [--key4 K] [--format text|json|trace]
//!   aqimc decrypt --text <TEXT> [--key1 K] [--key2 K] [--key3 K] [--key4 K] [--format text|json|trace]
//!   aqimc selftest
//!
//! Keys not given as flags are read from AQIMC_KEY1..AQIMC_KEY4. Without
//! `--text` the message is read from stdin. Log level comes from AQIMC_LOG
//! (default: warn).

use std::io::Read;
use std::process;

use aqimc::wire::{self, CipherResponse, DecryptRequest, EncryptRequest};
use aqimc::{Aqimc, CipherError, CipherOutput};

fn usage() -> ! {
    eprintln!(
        "AQIMC: four-layer keyed text cipher (DKSS, NRPE, VBMD, KDPP)\n\
         \n\
         Commands:\n\
         \n\
         Encrypt text:\n\
         \n\
         aqimc encrypt --text <TEXT> --key1 <K> --key2 <K> --key3 <K> --key4 <K>\n\
         \n\
         Decrypt text:\n\
         \n\
         aqimc decrypt --text <TEXT> --key1 <K> --key2 <K> --key3 <K> --key4 <K>\n\
         \n\
         Options:\n\
         \n\
         --format text|json|trace   output style (default: text)\n\
         Keys default to $AQIMC_KEY1..$AQIMC_KEY4; text defaults to stdin.\n\
         \n\
         Run the built-in round trip:\n\
         \n\
         aqimc selftest\n"
    );
    process::exit(1);
}

fn die(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    process::exit(1);
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("AQIMC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> (String, Vec<(String, String)>) {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let command = args[1].clone();
    let mut flags: Vec<(String, String)> = Vec::new();

    let mut i = 2;
    while i < args.len() {
        if args[i].starts_with("--") && i + 1 < args.len() {
            flags.push((args[i].clone(), args[i + 1].clone()));
            i += 2;
        } else {
            die(&format!("unexpected argument: {}", args[i]));
        }
    }

    (command, flags)
}

fn get_flag(flags: &[(String, String)], name: &str) -> Option<String> {
    flags.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
}

/// `--keyN`, then `$AQIMC_KEYN`.
fn key_flag(flags: &[(String, String)], n: usize) -> String {
    get_flag(flags, &format!("--key{}", n))
        .or_else(|| std::env::var(format!("AQIMC_KEY{}", n)).ok())
        .unwrap_or_else(|| die(&format!("missing key{}: pass --key{} or set AQIMC_KEY{}", n, n, n)))
}

fn text_flag(flags: &[(String, String)]) -> String {
    if let Some(text) = get_flag(flags, "--text") {
        return text;
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .unwrap_or_else(|e| die(&format!("read stdin: {}", e)));
    buf
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
    Trace,
}

impl Format {
    fn parse(value: Option<&str>) -> Result<Self, String> {
        match value {
            None | Some("text") => Ok(Format::Text),
            Some("json") => Ok(Format::Json),
            Some("trace") => Ok(Format::Trace),
            Some(other) => Err(format!("unknown format: {} (expected text, json or trace)", other)),
        }
    }
}

fn format_flag(flags: &[(String, String)]) -> Format {
    Format::parse(get_flag(flags, "--format").as_deref()).unwrap_or_else(|e| die(&e))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| die(&format!("serialize: {}", e)))
}

/// What a finished command prints, and where.
#[derive(Debug, PartialEq, Eq)]
enum Report {
    /// stdout, exit 0
    Success(String),
    /// stdout, exit 1
    JsonFailure(String),
    /// stderr via `die`
    Failure(String),
}

fn render_trace(out: &CipherOutput) -> String {
    let mut lines: Vec<String> = out
        .trace
        .iter()
        .map(|(layer, step)| format!("{:<5} {} -> {}", layer.name(), step.input, step.output))
        .collect();
    lines.push(out.text.clone());
    lines.join("\n")
}

fn render_report(
    result: Result<CipherOutput, CipherError>,
    format: Format,
    respond: fn(CipherOutput) -> CipherResponse,
) -> Report {
    match (result, format) {
        (Ok(out), Format::Text) => Report::Success(out.text),
        (Ok(out), Format::Trace) => Report::Success(render_trace(&out)),
        (Ok(out), Format::Json) => Report::Success(to_json(&respond(out))),
        (Err(e), Format::Json) => Report::JsonFailure(to_json(&CipherResponse::failure(&e))),
        (Err(e), _) => Report::Failure(e.to_string()),
    }
}

fn report(
    result: Result<CipherOutput, CipherError>,
    format: Format,
    respond: fn(CipherOutput) -> CipherResponse,
) {
    match render_report(result, format, respond) {
        Report::Success(text) => println!("{}", text),
        Report::JsonFailure(text) => {
            println!("{}", text);
            process::exit(1);
        }
        Report::Failure(msg) => die(&msg),
    }
}

fn cmd_encrypt(flags: &[(String, String)]) {
    let format = format_flag(flags);
    let req = EncryptRequest {
        plaintext: text_flag(flags),
        key1: key_flag(flags, 1),
        key2: key_flag(flags, 2),
        key3: key_flag(flags, 3),
        key4: key_flag(flags, 4),
    };
    report(req.execute(&Aqimc::new()), format, CipherResponse::encrypted);
}

fn cmd_decrypt(flags: &[(String, String)]) {
    let format = format_flag(flags);
    let req = DecryptRequest {
        ciphertext: text_flag(flags),
        key1: key_flag(flags, 1),
        key2: key_flag(flags, 2),
        key3: key_flag(flags, 3),
        key4: key_flag(flags, 4),
    };
    report(req.execute(&Aqimc::new()), format, CipherResponse::decrypted);
}

fn cmd_selftest() {
    let report = wire::self_test(&Aqimc::new()).unwrap_or_else(|e| die(&e.to_string()));
    println!("{}", to_json(&report));
    if !report.matches {
        process::exit(1);
    }
}

fn main() {
    init_logging();
    let (command, flags) = parse_args();

    match command.as_str() {
        "encrypt" => cmd_encrypt(&flags),
        "decrypt" => cmd_decrypt(&flags),
        "selftest" => cmd_selftest(),
        _ => {
            eprintln!("unknown command: {}", command);
            usage();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqimc::KeySchedule;
    use serde_json::Value;

    fn keys() -> KeySchedule {
        KeySchedule::derive("KEYA", "KEYB", "MATRIX", "PERMUTE").unwrap()
    }

    fn flags(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn format_parses_known_values() {
        assert_eq!(Format::parse(None), Ok(Format::Text));
        assert_eq!(Format::parse(Some("json")), Ok(Format::Json));
        assert_eq!(Format::parse(Some("trace")), Ok(Format::Trace));
        assert!(Format::parse(Some("yaml")).unwrap_err().contains("unknown format: yaml"));
    }

    #[test]
    fn key_flag_prefers_command_line() {
        let f = flags(&[("--key1", "FROMFLAG"), ("--text", "HELLO")]);
        assert_eq!(key_flag(&f, 1), "FROMFLAG");
        assert_eq!(get_flag(&f, "--text").as_deref(), Some("HELLO"));
        assert_eq!(get_flag(&f, "--key2"), None);
    }

    #[test]
    fn text_format_prints_ciphertext() {
        let out = Aqimc::new().encrypt("HELLO", &keys());
        assert_eq!(
            render_report(out, Format::Text, CipherResponse::encrypted),
            Report::Success("WAIRHGE".into())
        );
    }

    #[test]
    fn trace_format_lists_layers_then_result() {
        let out = Aqimc::new().encrypt("HELLO", &keys());
        let Report::Success(text) = render_report(out, Format::Trace, CipherResponse::encrypted) else {
            panic!("expected success");
        };
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "DKSS  HELLO -> RJLOC",
                "NRPE  RJLOC -> JINXWF",
                "VBMD  JINXWF -> IWRAGH",
                "KDPP  IWRAGH -> WAIRHG",
                "WAIRHGE",
            ]
        );
    }

    #[test]
    fn json_format_uses_wire_shape() {
        let out = Aqimc::new().decrypt("WAIRHGE", &keys());
        let Report::Success(text) = render_report(out, Format::Json, CipherResponse::decrypted) else {
            panic!("expected success");
        };
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["decrypted_text"], "HELLO");
        assert_eq!(v["steps"]["DKSS"]["output"], "HELLO");
    }

    #[test]
    fn errors_follow_the_format() {
        let err = || Aqimc::new().decrypt("WAIRHGZ", &keys());

        let Report::JsonFailure(text) = render_report(err(), Format::Json, CipherResponse::decrypted) else {
            panic!("expected json failure");
        };
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["success"], false);
        assert!(v["error"].as_str().unwrap().starts_with("length mismatch"));

        let Report::Failure(msg) = render_report(err(), Format::Text, CipherResponse::decrypted) else {
            panic!("expected plain failure");
        };
        assert!(msg.contains("unrecognised pad marker 'Z'"));
    }
}
