pub mod channels {
    include!("./generated/channels.rs");
}
