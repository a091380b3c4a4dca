use anyhow::{anyhow, Result};

pub fn validate_bind_addr(value: &str) -> Result<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|err| anyhow!("invalid bind_addr: {}", err))
}

pub fn validate_http_url(name: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} must not be empty", name));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(anyhow!("{} must start with http:// or https://", name));
    }
    Ok(())
}

pub fn validate_page_sizes(default_size: usize, max_size: usize) -> Result<()> {
    if default_size == 0 || max_size == 0 {
        return Err(anyhow!("page sizes must be greater than 0"));
    }
    if default_size > max_size {
        return Err(anyhow!(
            "default_page_size ({}) exceeds max_page_size ({})",
            default_size,
            max_size
        ));
    }
    Ok(())
}
