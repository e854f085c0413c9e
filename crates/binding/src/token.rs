//! Dashboard token contract bindings.

use alloy_sol_types::sol;

sol! {
    /// ERC20 token with an owner-restricted mint and a holder burn.
    #[sol(rpc)]
    interface IToken {
        /// Emitted when tokens move, including mint (from zero) and burn (to zero)
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 value
        );

        /// Get token name
        function name() external view returns (string memory);

        /// Get token symbol
        function symbol() external view returns (string memory);

        /// Get token decimals
        function decimals() external view returns (uint8);

        /// Get total supply
        function totalSupply() external view returns (uint256);

        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get the address allowed to mint
        function owner() external view returns (address);

        /// Transfer tokens to recipient
        function transfer(address recipient, uint256 amount) external returns (bool);

        /// Mint new supply to an account (owner only)
        function mint(address to, uint256 amount) external;

        /// Burn tokens held by the caller
        function burn(uint256 amount) external;
    }
}
