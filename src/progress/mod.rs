//! 学习进度核心：答案规范化、等级计算、掌握状态机、连胜账本，
//! 以及把它们编排成一次答题提交的引擎。
//!
//! 除 engine 外全部是纯函数，便于单测和性质测试。

pub mod choice;
pub mod engine;
pub mod level;
pub mod mastery;
pub mod streak;
