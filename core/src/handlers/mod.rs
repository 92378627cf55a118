mod diagnostic_recorder;

pub use diagnostic_recorder::DiagnosticRecorder;
