//! Shared type definitions for Formgate.
//!
//! These types cross crate boundaries: the credential material owned by the
//! credential store, the per-operation request inputs accepted from agents,
//! the wire-level batch operations sent to the Forms API, and the neutral
//! result contract handed to the presentation layer.

pub mod agent;
pub mod operation;
pub mod outcome;
pub mod result;

pub use agent::{AgentId, Credential};
pub use operation::{
    AddItemInput, ApiMethod, ApiRequest, BatchOperation, BatchUpdateRequest, ChoiceOption, ChoiceQuestion, ChoiceType,
    CreateFormInput, DeleteItemInput, EmailCollectionType, EmptyItem, FormInfoPatch, FormSettings, GetFormInput,
    GetResponsesInput, Item, Location, MoveItemInput, OperationKind, OperationRequest, Question, QuestionItem, QuizSettings,
    ScaleQuestion, TextQuestion, UpdateFormInput,
};
pub use outcome::DispatchOutcome;
pub use result::{Alert, AlertVariant, AuthPrompt, Card, NeutralResult, Presentation, Table, TableColumn};
