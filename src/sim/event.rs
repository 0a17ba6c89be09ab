/// Events emitted during a simulation step.
/// The front-end consumes these for phase changes, audio and logs.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    /// Player and enemy rectangles overlap: the run is over.
    PlayerCaught { enemy: usize },
    /// Enemy switched from patrol to chase.
    EnemyAggro { enemy: usize },
    /// Enemy gave up the chase.
    EnemyLostAggro { enemy: usize },
}
