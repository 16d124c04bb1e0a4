pub mod mgnrega_record;
pub mod sync_state;
