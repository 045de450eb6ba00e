use crate::size::ByteSize;
use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("url")
                .action(ArgAction::Append)
                .default_value("http://127.0.0.1:2379")
                .env("CHECK_ETCD_URL")
                .help("Url of etcd instance(s), only the first one is checked")
                .long("url")
                .short('u')
                .value_delimiter(',')
                .value_name("URL"),
        )
        .arg(
            Arg::new("size")
                .default_value("1.5G")
                .env("CHECK_ETCD_SIZE")
                .help("Maximum database size in bytes")
                .long("size")
                .long_help(
                    "Maximum database size before the check goes critical.\n\
                    Plain bytes or a decimal suffix (K, M, G, T):\n\n\
                    - 1000000000 or 1G\n\
                    - 1.5G (default, the etcd quota defaults to 2G)\n\
                    - 3G"
                )
                .value_name("SIZE")
                .value_parser(clap::value_parser!(ByteSize)),
        )
        .arg(
            Arg::new("cert-file")
                .env("CHECK_ETCD_CERT_FILE")
                .help("Path to the client certificate")
                .long("cert-file")
                .value_name("PATH")
                .requires("key-file")
                .requires("trusted-ca-file"),
        )
        .arg(
            Arg::new("key-file")
                .env("CHECK_ETCD_KEY_FILE")
                .help("Path to the client certificate key")
                .long("key-file")
                .value_name("PATH")
                .requires("cert-file"),
        )
        .arg(
            Arg::new("trusted-ca-file")
                .env("CHECK_ETCD_TRUSTED_CA_FILE")
                .help("Path to the CA file")
                .long("trusted-ca-file")
                .long_help(
                    "Path to the Certificate Authority (CA) file used to verify etcd.\n\
                    On its own it enables TLS without a client certificate.\n\n\
                    Example: /etc/etcd/pki/ca.crt"
                )
                .value_name("PATH"),
        )
        .arg(
            Arg::new("timeout")
                .default_value("5")
                .env("CHECK_ETCD_TIMEOUT")
                .help("Connect and request timeout in seconds")
                .long("timeout")
                .short('t')
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("scheme")
                .env("CHECK_ETCD_SCHEME")
                .help("Label for metric output (default: hostname)")
                .long("scheme")
                .short('s')
                .value_name("LABEL"),
        )
        .arg(
            Arg::new("metrics")
                .action(ArgAction::SetTrue)
                .env("CHECK_ETCD_METRICS")
                .help("Print the database size as a metric line before the result")
                .long("metrics")
                .short('m'),
        )
        .arg(
            Arg::new("textfile")
                .env("CHECK_ETCD_TEXTFILE")
                .help("Write Prometheus metrics to this file (node exporter textfile collector)")
                .long("textfile")
                .value_name("PATH"),
        )
        .arg(
            Arg::new("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity on stderr (-v, -vv, -vvv)")
                .long("verbose")
                .short('v'),
        )
}
