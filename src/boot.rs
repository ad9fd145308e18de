use socks5_dialer::socks::SOCKS_DEFAULT_PORT;
use socks5_dialer::{Proxy, ProxyAuth};

use getopts::Options;

use std::net::{IpAddr, SocketAddr};


pub struct Config {
    pub proxy: Proxy,
    /// `host:port`
    pub target: String,
    pub path: String,
}

fn usage(program: &str, opts: &Options) -> String {
    let brief = format!("Usage: {} [options] HOST:PORT[/PATH]", program);
    opts.usage(&brief)
}

pub fn boot_client() -> Result<Config, Box<dyn std::error::Error>> {
    // 设定日志等级
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    // 读取参数配置
    let args: Vec<String> = std::env::args().collect();
    let program = args.get(0).map(|s| s.as_str()).unwrap_or("socks5-get");

    let mut opts = Options::new();
    opts.optopt("p", "proxy", "socks5 proxy address (default 127.0.0.1:1080)", "HOST[:PORT]");
    opts.optopt("u", "user", "username for proxy authentication", "NAME");
    opts.optopt("P", "pass", "password for proxy authentication", "PASSWORD");
    opts.optflag("i", "isolate", "use random credentials to get an isolated circuit");
    opts.optflag("h", "help", "print this help menu");

    let matches = opts.parse(args.iter().skip(1))?;
    if matches.opt_present("h") || matches.free.len() != 1 {
        print!("{}", usage(program, &opts));
        std::process::exit(if matches.opt_present("h") { 0 } else { 2 });
    }

    let proxy_addr = with_default_port(&matches.opt_str("p").unwrap_or_else(|| "127.0.0.1".to_string()));
    let mut proxy = Proxy::new(proxy_addr.as_str())?;
    proxy.auth = proxy_auth(matches.opt_str("u"), matches.opt_str("P"), matches.opt_present("i"))?;

    let url = &matches.free[0];
    let url = url.strip_prefix("http://").unwrap_or(url);
    let (target, path) = match url.find('/') {
        Some(pos) => (url[..pos].to_string(), url[pos..].to_string()),
        None => (url.to_string(), "/".to_string()),
    };

    Ok(Config { proxy, target, path })
}

/// Appends the SOCKS port when `addr` carries none. Bare IPv6 literals get bracketed.
fn with_default_port(addr: &str) -> String {
    if addr.parse::<SocketAddr>().is_ok() {
        return addr.to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return SocketAddr::new(ip, SOCKS_DEFAULT_PORT).to_string();
    }
    if addr.starts_with('[') && addr.ends_with(']') {
        return format!("{}:{}", addr, SOCKS_DEFAULT_PORT);
    }
    if addr.contains(':') {
        return addr.to_string();
    }

    format!("{}:{}", addr, SOCKS_DEFAULT_PORT)
}

fn proxy_auth(user: Option<String>, pass: Option<String>, isolate: bool) -> Result<ProxyAuth, String> {
    match (user, pass, isolate) {
        (Some(_), _, true) => Err("--isolate cannot be combined with --user".to_string()),
        (None, Some(_), _) => Err("--pass requires --user".to_string()),
        (Some(username), password, false) => Ok(ProxyAuth::Credentials {
            username,
            password: password.unwrap_or_default(),
        }),
        (None, None, true) => Ok(ProxyAuth::Isolation),
        (None, None, false) => Ok(ProxyAuth::None),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_is_added_only_when_missing() {
        assert_eq!(with_default_port("127.0.0.1"), "127.0.0.1:1080");
        assert_eq!(with_default_port("127.0.0.1:9050"), "127.0.0.1:9050");
        assert_eq!(with_default_port("localhost"), "localhost:1080");
        assert_eq!(with_default_port("localhost:9050"), "localhost:9050");
        assert_eq!(with_default_port("::1"), "[::1]:1080");
        assert_eq!(with_default_port("[::1]"), "[::1]:1080");
        assert_eq!(with_default_port("[::1]:9050"), "[::1]:9050");
    }

    #[test]
    fn pass_without_user_is_rejected() {
        assert!(proxy_auth(None, Some("secret".into()), false).is_err());
        assert!(proxy_auth(None, Some("secret".into()), true).is_err());
    }

    #[test]
    fn auth_modes() {
        assert_eq!(proxy_auth(None, None, false).unwrap(), ProxyAuth::None);
        assert_eq!(proxy_auth(None, None, true).unwrap(), ProxyAuth::Isolation);
        assert_eq!(
            proxy_auth(Some("u".into()), None, false).unwrap(),
            ProxyAuth::Credentials { username: "u".into(), password: String::new() }
        );
        assert!(proxy_auth(Some("u".into()), Some("p".into()), true).is_err());
    }
}
