// ABOUTME: Parsers for the docker-style mapping strings used in the config file.
// ABOUTME: Ports ([ip:]host:container[/proto]), bind mounts, and extra hosts.

use crate::runtime::{ExtraHost, PortMapping, Protocol, VolumeMount};
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("invalid port mapping '{0}': expected [ip:]host:container[/tcp|udp]")]
    Port(String),

    #[error("invalid volume '{0}': expected host:container[:ro|rw]")]
    Volume(String),

    #[error("invalid extra host '{0}': expected hostname:address")]
    ExtraHost(String),
}

/// Parse a port mapping like `9099`, `8080:80`, `127.0.0.1:8080:80/udp`.
pub fn parse_port_mapping(spec: &str) -> Result<PortMapping, MappingError> {
    let err = || MappingError::Port(spec.to_string());

    let (port_part, protocol) = match spec.split_once('/') {
        Some((ports, "tcp")) => (ports, Protocol::Tcp),
        Some((ports, "udp")) => (ports, Protocol::Udp),
        Some(_) => return Err(err()),
        None => (spec, Protocol::Tcp),
    };

    let port = |s: &str| s.parse::<u16>().ok().filter(|p| *p != 0).ok_or_else(err);

    let parts: Vec<&str> = port_part.split(':').collect();
    let (host_ip, host_port, container_port) = match parts.as_slice() {
        [container] => (None, None, port(container)?),
        [host, container] => (None, Some(port(host)?), port(container)?),
        [ip, host, container] => {
            ip.parse::<IpAddr>().map_err(|_| err())?;
            (Some(ip.to_string()), Some(port(host)?), port(container)?)
        }
        _ => return Err(err()),
    };

    Ok(PortMapping {
        host_port,
        container_port,
        protocol,
        host_ip,
    })
}

/// Parse a bind mount like `./data:/data` or `/etc/app:/config:ro`.
///
/// Relative host paths are resolved against `base`, the directory holding
/// the config file.
pub fn parse_volume_mount(spec: &str, base: &Path) -> Result<VolumeMount, MappingError> {
    let err = || MappingError::Volume(spec.to_string());

    let parts: Vec<&str> = spec.split(':').collect();
    let (source, target, read_only) = match parts.as_slice() {
        [source, target] => (*source, *target, false),
        [source, target, "ro"] => (*source, *target, true),
        [source, target, "rw"] => (*source, *target, false),
        _ => return Err(err()),
    };

    if source.is_empty() || !target.starts_with('/') {
        return Err(err());
    }

    let source_path = Path::new(source);
    let source = if source_path.is_absolute() {
        source.to_string()
    } else {
        let joined = base.join(source_path.strip_prefix(".").unwrap_or(source_path));
        joined.to_string_lossy().into_owned()
    };

    Ok(VolumeMount {
        source,
        target: target.to_string(),
        read_only,
    })
}

/// Parse an extra host like `host.docker.internal:host-gateway`.
pub fn parse_extra_host(spec: &str) -> Result<ExtraHost, MappingError> {
    let err = || MappingError::ExtraHost(spec.to_string());

    // Addresses may be IPv6, so only the first colon separates the hostname.
    let (hostname, address) = spec.split_once(':').ok_or_else(err)?;
    if hostname.is_empty() || address.is_empty() {
        return Err(err());
    }
    if address != "host-gateway" && address.parse::<IpAddr>().is_err() {
        return Err(err());
    }

    Ok(ExtraHost {
        hostname: hostname.to_string(),
        address: address.to_string(),
    })
}
