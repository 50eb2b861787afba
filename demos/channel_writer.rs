//! Type numbers, one per line. Each is written to the `raw` channel and
//! the tripled value read back from `multipliedByThree`. An empty line
//! stops.

use std::{io::BufRead, sync::Arc};

use chandata::{
    stream::{decode_events, read_request, write_request, ChannelUpdate},
    ChannelDecoder, ChannelEncoder,
};
use chrono::Utc;
use demos::time_series::{
    raw_attributes, tripled_attributes, TimeSeries, TripledTimeSeries, TriplingModule,
};
use futures::{pin_mut, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let (tx, rx) = mpsc::channel(16);
    let module = TriplingModule::new(tx);

    // Reading from an output channel
    let request = read_request("multipliedByThree", &tripled_attributes());
    info!(
        "Reading {} attributes from {}",
        request.attributes.len(),
        request.channel_name
    );
    let decoder = Arc::new(ChannelDecoder::<TripledTimeSeries>::new(tripled_attributes()).unwrap());
    let reader = tokio::spawn(async move {
        let updates = decode_events(decoder, ReceiverStream::new(rx));
        pin_mut!(updates);
        while let Some(update) = updates.next().await {
            match update {
                Ok(ChannelUpdate::Added(rows)) => {
                    for datum in rows {
                        println!("{}: {}", datum.date_time, datum.tripled_value);
                    }
                }
                Ok(ChannelUpdate::Other(kind)) => warn!("Ignoring event {}", kind),
                Err(status) => warn!("Read failed: {}", status),
            }
        }
    });

    // Writing to an input channel in a loop
    let encoder = ChannelEncoder::<TimeSeries>::new(raw_attributes()).unwrap();
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.unwrap();
        if line.trim().is_empty() {
            break;
        }
        let Ok(value) = line.trim().parse::<f64>() else {
            continue;
        };
        let datum = TimeSeries {
            date_time: Utc::now(),
            value,
        };
        let request = write_request("raw", &encoder, [&datum]).unwrap();
        module.write_channel(request).await.unwrap();
    }

    // closes the read stream
    drop(module);
    reader.await.unwrap();
}
