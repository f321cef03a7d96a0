//! Bring-up driver for the WiFi control plane: runs the station state
//! machine against a scripted radio so the scan/select/connect path can be
//! exercised end to end without hardware.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wifictl::{
    ApRecord, AuthMode, Bssid, CipherType, FastScanThreshold, HandlerError, ScanMethod,
    SecIpStatus, SortMethod, Ssid, StaConfig, WifiConfig, WifiController, WifiEvent,
};

/// Exercise the station control plane against a scripted radio
#[derive(Parser, Debug)]
#[command(
    name = "wifictl",
    about = "Drives the WiFi station state machine against a scripted radio.",
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    /// Target network name
    #[arg(long)]
    ssid: String,

    /// Passphrase; omit for open networks, 64 bytes are taken as a raw PMK
    #[arg(long, default_value = "")]
    password: String,

    /// Lock onto one AP (aa:bb:cc:dd:ee:ff) instead of any AP with the SSID
    #[arg(long)]
    bssid: Option<String>,

    /// Sweep every channel and rank candidates instead of stopping at the
    /// first acceptable one
    #[arg(long)]
    all_channel: bool,

    /// Rank surviving candidates by auth strength instead of signal
    #[arg(long)]
    by_security: bool,

    /// Weakest RSSI to accept, in dBm
    #[arg(long, default_value_t = -90)]
    min_rssi: i8,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let ssid: Ssid = args.ssid.parse()?;

    let mut sta = StaConfig::new(ssid, SecretString::from(args.password));
    if let Some(bssid) = &args.bssid {
        sta.bssid = Some(bssid.parse()?);
    }
    sta.scan_method = if args.all_channel {
        ScanMethod::AllChannel
    } else {
        ScanMethod::Fast
    };
    sta.sort_method = if args.by_security {
        SortMethod::BySecurity
    } else {
        SortMethod::BySignal
    };
    sta.threshold = FastScanThreshold {
        min_rssi: args.min_rssi,
        min_auth_mode: AuthMode::Open,
    };

    let controller = Arc::new(WifiController::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    controller.register_handler(Arc::new(
        move |event: &WifiEvent| -> Result<(), HandlerError> {
            let _ = tx.send(event.clone());
            Ok(())
        },
    ));

    controller.init(WifiConfig::Sta(sta))?;
    let scan = controller.start_scan()?;

    let radio = Arc::clone(&controller);
    tokio::spawn(async move {
        if let Err(err) = run_scripted_radio(&radio, scan).await {
            warn!(%err, "scripted radio aborted");
        }
    });

    // The radio ends every attempt in got_ip, link_fail or silence; silence
    // means no acceptable AP was found.
    loop {
        let event = match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => return Err(eyre!("event channel closed unexpectedly")),
            Err(_) => {
                controller.stop()?;
                return Err(eyre!("no acceptable AP found for '{}'", args.ssid));
            }
        };
        info!(code = event.code(), "{event:?}");
        match event {
            WifiEvent::StaGotIp => {
                let (ssid, bssid) = controller
                    .peer()
                    .ok_or_else(|| eyre!("connected without a peer"))?;
                println!("connected: {ssid} via {bssid}");
                controller.stop()?;
                return Ok(());
            }
            WifiEvent::StaConnectionFailed { reason } => {
                controller.stop()?;
                return Err(eyre!("connection failed: {reason}"));
            }
            _ => {}
        }
    }
}

/// Stand-in for the radio/link collaborator: reports a fixed neighborhood,
/// completes the scan, and brings the link up for whatever candidate the
/// controller chose.
async fn run_scripted_radio(controller: &WifiController, scan: wifictl::ScanId) -> Result<()> {
    // Crypto engine self-check; positive status words are advisory only
    let status = SecIpStatus::from_code(16);
    if status.is_fatal() {
        return Err(eyre!("security engine failed self-check: {status}"));
    }
    if status.is_advisory() {
        warn!(%status, "security engine warning during bring-up");
    }

    let target = controller
        .config()
        .and_then(|c| c.as_sta().map(|s| s.ssid))
        .ok_or_else(|| eyre!("radio started without a station config"))?;

    for record in scripted_neighborhood(target) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.ingest_scan_record(record)?;
    }

    let candidate = controller.scan_complete(scan)?;
    let Some(candidate) = candidate else {
        info!("selection policy found no acceptable AP");
        return Ok(());
    };

    controller.connect(&candidate)?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.link_up()?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    controller.got_ip()?;
    Ok(())
}

/// Two APs of the target ESS plus unrelated neighbors
fn scripted_neighborhood(target: Ssid) -> Vec<ApRecord> {
    let ap = |ssid: Ssid, tag: u8, channel: u8, auth_mode: AuthMode, rssi: i8| ApRecord {
        ssid,
        bssid: Bssid([0x6e, 0x10, 0x42, 0, 0, tag]),
        channel,
        auth_mode,
        pairwise_cipher: if auth_mode == AuthMode::Open {
            CipherType::None
        } else {
            CipherType::Ccmp
        },
        group_cipher: if auth_mode == AuthMode::Open {
            CipherType::None
        } else {
            CipherType::Ccmp
        },
        rssi,
        beacon_interval: 100,
        capability_info: 0x431,
    };
    vec![
        ap("cafe-guest".parse().unwrap(), 1, 1, AuthMode::Open, -38),
        ap(target, 2, 6, AuthMode::Wpa2Psk, -57),
        ap(
            "warehouse-iot".parse().unwrap(),
            3,
            11,
            AuthMode::WpaPsk,
            -73,
        ),
        ap(target, 4, 36, AuthMode::Wpa2Psk, -49),
    ]
}
