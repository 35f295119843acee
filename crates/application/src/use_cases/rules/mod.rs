mod replace;

pub use replace::ReplaceRulesUseCase;
