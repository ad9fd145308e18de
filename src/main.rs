#[allow(unused_imports)]
#[macro_use]
extern crate log;
extern crate env_logger;
extern crate getopts;
extern crate tokio;
extern crate socks5_dialer;


mod boot;

use tokio::io::{AsyncReadExt, AsyncWriteExt};


fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = boot::boot_client()?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async move {
        let mut stream = config.proxy.dial_async(&config.target).await?;
        info!("tunnel to {} via {} is ready", config.target, config.proxy.addr);

        let host = config.target.rsplitn(2, ':').last().unwrap_or(&config.target);
        let request = format!(
            "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
            config.path, host.trim_start_matches('[').trim_end_matches(']')
        );
        stream.write_all(request.as_bytes()).await?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&response).await?;
        stdout.flush().await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
