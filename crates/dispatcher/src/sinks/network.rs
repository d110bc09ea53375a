//! NetworkSink - UDP fire-and-forget streaming

use contracts::{DispatchError, Record, RecordSink};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: WireFormat,
    /// Max packet size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => WireFormat::Bincode,
            Some("json") | None => WireFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends records over UDP
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(&config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, DispatchError> {
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| DispatchError::sink_deliver("network", e))?;

        Self::new(name, config)
            .await
            .map_err(|e| DispatchError::SinkConnection {
                sink_name: "network".to_string(),
                message: e.to_string(),
            })
    }

    fn serialize_record(&self, record: &Record) -> Result<Vec<u8>, String> {
        match self.config.format {
            WireFormat::Json => {
                serde_json::to_vec(record).map_err(|e| format!("json error: {}", e))
            }
            WireFormat::Bincode => {
                bincode::serialize(record).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, DispatchError> {
        self.socket
            .as_ref()
            .ok_or_else(|| DispatchError::sink_deliver(&self.name, "socket not connected"))
    }

    fn prepare_payload(&self, record: &Record) -> Result<Vec<u8>, DispatchError> {
        let data = self
            .serialize_record(record)
            .map_err(|e| DispatchError::sink_deliver(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Packet exceeds max size, datagram may be truncated"
            );
        }

        Ok(data)
    }

    async fn transmit(&self, socket: &UdpSocket, data: &[u8], seq: u64) {
        match socket.send(data).await {
            Ok(sent) => {
                debug!(sink = %self.name, seq, bytes = sent, "Sent");
            }
            Err(e) => {
                // UDP is best-effort
                error!(sink = %self.name, error = %e, "UDP send failed");
            }
        }
    }
}

impl RecordSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_deliver",
        skip(self, record),
        fields(sink = %self.name, seq = record.seq)
    )]
    async fn deliver(&mut self, record: &Record) -> Result<(), DispatchError> {
        let socket = self.socket()?;
        let data = self.prepare_payload(record)?;
        self.transmit(socket, &data, record.seq).await;
        Ok(())
    }

    #[instrument(name = "network_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), DispatchError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), DispatchError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Payload;
    use std::collections::HashMap;

    fn record(seq: u64) -> Record {
        Record {
            stream: "net".into(),
            seq,
            timestamp: seq as f64,
            payload: Payload::Text("payload".into()),
            attrs: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_network_sink_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "json".to_string());

        let config = NetworkSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, WireFormat::Json);
    }

    #[tokio::test]
    async fn test_network_sink_config_rejects_unknown_format() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "xml".to_string());

        assert!(NetworkSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_network_sink_create() {
        let config = NetworkSinkConfig {
            addr: "127.0.0.1:19999".parse().unwrap(),
            format: WireFormat::Json,
            max_packet_size: 65000,
        };

        let sink = NetworkSink::new("test_net", config).await;
        // Should succeed even if no receiver (UDP doesn't care)
        assert!(sink.is_ok());
    }

    #[tokio::test]
    async fn test_network_sink_deliver() {
        let config = NetworkSinkConfig {
            addr: "127.0.0.1:19998".parse().unwrap(),
            format: WireFormat::Bincode,
            max_packet_size: 65000,
        };

        let mut sink = NetworkSink::new("test_net", config).await.unwrap();

        // Should not fail even with no receiver
        let result = sink.deliver(&record(1)).await;
        assert!(result.is_ok());
    }
}
