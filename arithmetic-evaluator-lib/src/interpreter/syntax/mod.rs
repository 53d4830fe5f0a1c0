pub mod expression_tree;
