//! Streams random readings through the tripling module and logs a running
//! summary of what comes back.

use std::{sync::Arc, time::Duration};

use chandata::{
    stream::{boxed_decode_events, write_request, ChannelUpdate},
    ChannelDecoder, ChannelEncoder,
};
use demos::time_series::{
    random_reading, raw_attributes, tripled_attributes, TimeSeries, TripledTimeSeries,
    TriplingModule,
};
use rand::{thread_rng, Rng};
use tokio::{sync::mpsc, time::sleep};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::info;

const BATCH_MAX: usize = 50;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let (tx, rx) = mpsc::channel(16);
    let module = TriplingModule::new(tx);
    let decoder = Arc::new(ChannelDecoder::<TripledTimeSeries>::new(tripled_attributes()).unwrap());
    let mut updates = boxed_decode_events(decoder, ReceiverStream::new(rx));

    tokio::spawn(async move {
        let encoder = ChannelEncoder::<TimeSeries>::new(raw_attributes()).unwrap();
        loop {
            let n = thread_rng().gen_range(1..=BATCH_MAX);
            let batch = (0..n).map(|_| random_reading()).collect::<Vec<_>>();
            let request = write_request("raw", &encoder, &batch).unwrap();
            if module.write_channel(request).await.is_err() {
                break;
            }
            sleep(Duration::from_millis(100)).await;
        }
    });

    let (mut rows, mut sum) = (0usize, 0.0);
    while let Some(update) = updates.next().await {
        if let ChannelUpdate::Added(batch) = update.unwrap() {
            rows += batch.len();
            sum += batch.iter().map(|r| r.tripled_value).sum::<f64>();
            if let Some(last) = batch.last() {
                info!(
                    "{} rows, mean {:.3}, last {} at {}",
                    rows,
                    sum / rows as f64,
                    last.tripled_value,
                    last.date_time
                );
            }
        }
    }
}
