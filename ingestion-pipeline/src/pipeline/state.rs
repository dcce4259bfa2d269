use state_machines::state_machine;

state_machine! {
    name: IndexingMachine,
    state: IndexingState,
    initial: Ready,
    states: [Ready, Chunked, Embedded, Persisted, Failed],
    events {
        chunk { transition: { from: Ready, to: Chunked } }
        embed { transition: { from: Chunked, to: Embedded } }
        persist { transition: { from: Embedded, to: Persisted } }
        abort {
            transition: { from: Ready, to: Failed }
            transition: { from: Chunked, to: Failed }
            transition: { from: Embedded, to: Failed }
            transition: { from: Persisted, to: Failed }
        }
    }
}

pub fn ready() -> IndexingMachine<(), Ready> {
    IndexingMachine::new(())
}
